use chrono::{DateTime, Duration, Utc};

use crate::domain::analytics::{
    self, Anomaly, CategorySpending, MonthlyTotals, StatisticsSummary, TypeTotals,
};
use crate::domain::{OwnerId, Transaction, TransactionFilter};

use super::{AppError, FinanceService};

/// Months of history the spending forecast looks at.
pub const FORECAST_HISTORY_MONTHS: u32 = 6;

/// Days counted as one month when turning a month count into a date range.
const DAYS_PER_MONTH: i64 = 30;

impl FinanceService {
    // ========================
    // Reporting operations
    // ========================

    async fn transactions_between(
        &self,
        owner_id: OwnerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .repo
            .list_transactions(owner_id, &TransactionFilter::between(start, end))
            .await?)
    }

    /// Income, expense and net over an optional date range.
    pub async fn totals_by_type(
        &self,
        owner_id: OwnerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<TypeTotals, AppError> {
        let transactions = self.transactions_between(owner_id, start, end).await?;
        Ok(analytics::totals_by_type(&transactions))
    }

    /// Expense totals per category, largest first.
    pub async fn spending_by_category(
        &self,
        owner_id: OwnerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CategorySpending>, AppError> {
        let filter = TransactionFilter {
            start_date: start,
            end_date: end,
            ..TransactionFilter::expenses()
        };
        let expenses = self.repo.list_transactions(owner_id, &filter).await?;
        Ok(analytics::spending_by_category(&expenses))
    }

    /// Income and expense per calendar month over the last `months * 30`
    /// days up to `as_of`, oldest month first.
    pub async fn monthly_trend(
        &self,
        owner_id: OwnerId,
        months: u32,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<MonthlyTotals>, AppError> {
        let start = Duration::try_days(i64::from(months) * DAYS_PER_MONTH)
            .and_then(|span| as_of.checked_sub_signed(span))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Trend window of {months} months reaches past the earliest supported date"
                ))
            })?;
        let transactions = self
            .transactions_between(owner_id, Some(start), Some(as_of))
            .await?;
        Ok(analytics::monthly_totals(&transactions))
    }

    /// Average expense per day between the first and last expense in an
    /// optional date range.
    pub async fn daily_average_spending(
        &self,
        owner_id: OwnerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<f64, AppError> {
        let filter = TransactionFilter {
            start_date: start,
            end_date: end,
            ..TransactionFilter::expenses()
        };
        let expenses = self.repo.list_transactions(owner_id, &filter).await?;
        Ok(analytics::daily_average_spending(&expenses))
    }

    /// Expenses whose z-score exceeds `threshold` in absolute value.
    pub async fn detect_anomalies(
        &self,
        owner_id: OwnerId,
        threshold: f64,
    ) -> Result<Vec<Anomaly>, AppError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AppError::Validation(format!(
                "Anomaly threshold must be a non-negative number, got {threshold}"
            )));
        }
        let expenses = self
            .repo
            .list_transactions(owner_id, &TransactionFilter::expenses())
            .await?;
        Ok(analytics::detect_anomalies(&expenses, threshold))
    }

    /// Expected expense for the month after `as_of`.
    pub async fn forecast_next_month(
        &self,
        owner_id: OwnerId,
        as_of: DateTime<Utc>,
    ) -> Result<f64, AppError> {
        let trend = self
            .monthly_trend(owner_id, FORECAST_HISTORY_MONTHS, as_of)
            .await?;
        Ok(analytics::forecast_next_month(&trend))
    }

    /// Totals, averages and counts over the owner's transactions in an
    /// optional date range.
    pub async fn statistics_summary(
        &self,
        owner_id: OwnerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<StatisticsSummary, AppError> {
        let transactions = self.transactions_between(owner_id, start, end).await?;
        Ok(analytics::summarize(&transactions))
    }
}
