use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionType};

/// Minimum number of expenses before anomaly detection says anything.
pub const MIN_ANOMALY_SAMPLE: usize = 5;

/// Number of trailing months averaged by the spending forecast.
pub const FORECAST_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub income: Cents,
    pub expense: Cents,
    pub net: Cents,
}

/// Sum income and expense separately.
pub fn totals_by_type(transactions: &[Transaction]) -> TypeTotals {
    let (income, expense) =
        transactions
            .iter()
            .fold((0, 0), |(income, expense), tx| match tx.transaction_type {
                TransactionType::Income => (income + tx.amount_cents, expense),
                TransactionType::Expense => (income, expense + tx.amount_cents),
            });
    TypeTotals {
        income,
        expense,
        net: income - expense,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub total: Cents,
    pub count: i64,
    pub average: f64,
}

/// Expense totals grouped by category, largest first.
pub fn spending_by_category(transactions: &[Transaction]) -> Vec<CategorySpending> {
    let mut groups: HashMap<&str, (Cents, i64)> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let entry = groups.entry(tx.category.as_str()).or_insert((0, 0));
        entry.0 += tx.amount_cents;
        entry.1 += 1;
    }

    let mut spending: Vec<CategorySpending> = groups
        .into_iter()
        .map(|(category, (total, count))| CategorySpending {
            category: category.to_string(),
            total,
            count,
            average: total as f64 / count as f64,
        })
        .collect();
    spending.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    spending
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub year: i32,
    pub month: u32,
    pub income: Cents,
    pub expense: Cents,
}

/// Income and expense per calendar month, oldest first. Months without any
/// transaction are absent.
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<MonthlyTotals> {
    let mut months: BTreeMap<(i32, u32), (Cents, Cents)> = BTreeMap::new();
    for tx in transactions {
        let entry = months
            .entry((tx.date.year(), tx.date.month()))
            .or_insert((0, 0));
        match tx.transaction_type {
            TransactionType::Income => entry.0 += tx.amount_cents,
            TransactionType::Expense => entry.1 += tx.amount_cents,
        }
    }

    months
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlyTotals {
            year,
            month,
            income,
            expense,
        })
        .collect()
}

/// Average expense per day across the inclusive span between the earliest
/// and latest expense. Zero without expenses.
pub fn daily_average_spending(transactions: &[Transaction]) -> f64 {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|tx| tx.is_expense()).collect();
    let (Some(first), Some(last)) = (
        expenses.iter().map(|tx| tx.date.date_naive()).min(),
        expenses.iter().map(|tx| tx.date.date_naive()).max(),
    ) else {
        return 0.0;
    };

    let days = (last - first).num_days() + 1;
    let total: Cents = expenses.iter().map(|tx| tx.amount_cents).sum();
    total as f64 / days as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub transaction: Transaction,
    pub z_score: f64,
}

/// Expenses whose amount lies more than `threshold` sample standard
/// deviations away from the mean expense.
pub fn detect_anomalies(transactions: &[Transaction], threshold: f64) -> Vec<Anomaly> {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|tx| tx.is_expense()).collect();
    if expenses.len() < MIN_ANOMALY_SAMPLE {
        return Vec::new();
    }

    let amounts: Vec<f64> = expenses.iter().map(|tx| tx.amount_cents as f64).collect();
    let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
    let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>()
        / (amounts.len() - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return Vec::new();
    }

    expenses
        .into_iter()
        .filter_map(|tx| {
            let z_score = (tx.amount_cents as f64 - mean) / std_dev;
            (z_score.abs() > threshold).then(|| Anomaly {
                transaction: tx.clone(),
                z_score,
            })
        })
        .collect()
}

/// Moving-average forecast: mean expense of the last `FORECAST_WINDOW`
/// months present in the trend.
pub fn forecast_next_month(trend: &[MonthlyTotals]) -> f64 {
    let window: Vec<Cents> = trend
        .iter()
        .rev()
        .take(FORECAST_WINDOW)
        .map(|month| month.expense)
        .collect();
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<Cents>() as f64 / window.len() as f64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_expenses: Cents,
    pub total_income: Cents,
    pub avg_expense: f64,
    pub avg_income: f64,
    pub median_expense: f64,
    pub transaction_count: usize,
    pub expense_count: usize,
    pub income_count: usize,
    pub net_balance: Cents,
}

pub fn summarize(transactions: &[Transaction]) -> StatisticsSummary {
    let mut expenses: Vec<Cents> = Vec::new();
    let mut income: Vec<Cents> = Vec::new();
    for tx in transactions {
        match tx.transaction_type {
            TransactionType::Expense => expenses.push(tx.amount_cents),
            TransactionType::Income => income.push(tx.amount_cents),
        }
    }

    let total_expenses: Cents = expenses.iter().sum();
    let total_income: Cents = income.iter().sum();

    StatisticsSummary {
        total_expenses,
        total_income,
        avg_expense: mean(total_expenses, expenses.len()),
        avg_income: mean(total_income, income.len()),
        median_expense: median(&mut expenses),
        transaction_count: transactions.len(),
        expense_count: expenses.len(),
        income_count: income.len(),
        net_balance: total_income - total_expenses,
    }
}

fn mean(total: Cents, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn median(values: &mut [Cents]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn tx(kind: TransactionType, category: &str, amount: Cents, ymd: (i32, u32, u32)) -> Transaction {
        let date = Utc.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 0, 0, 0).unwrap();
        Transaction::new(Uuid::new_v4(), kind, category, amount, date)
    }

    fn expense(category: &str, amount: Cents, ymd: (i32, u32, u32)) -> Transaction {
        tx(TransactionType::Expense, category, amount, ymd)
    }

    fn income(amount: Cents, ymd: (i32, u32, u32)) -> Transaction {
        tx(TransactionType::Income, "Wage", amount, ymd)
    }

    #[test]
    fn test_totals_by_type() {
        let txs = vec![
            income(300000, (2024, 1, 1)),
            expense("Shopping", 5000, (2024, 1, 2)),
            expense("Rent", 100000, (2024, 1, 3)),
        ];
        let totals = totals_by_type(&txs);
        assert_eq!(totals.income, 300000);
        assert_eq!(totals.expense, 105000);
        assert_eq!(totals.net, 195000);
        assert_eq!(totals_by_type(&[]), TypeTotals::default());
    }

    #[test]
    fn test_spending_by_category_sorted_and_expense_only() {
        let txs = vec![
            expense("Shopping", 1000, (2024, 1, 1)),
            expense("Shopping", 3000, (2024, 1, 2)),
            expense("Rent", 90000, (2024, 1, 3)),
            income(500000, (2024, 1, 4)),
        ];
        let spending = spending_by_category(&txs);
        assert_eq!(spending.len(), 2);
        assert_eq!(spending[0].category, "Rent");
        assert_eq!(spending[1].category, "Shopping");
        assert_eq!(spending[1].total, 4000);
        assert_eq!(spending[1].count, 2);
        assert_eq!(spending[1].average, 2000.0);
    }

    #[test]
    fn test_monthly_totals_groups_by_calendar_month() {
        let txs = vec![
            expense("Shopping", 1000, (2023, 12, 31)),
            expense("Shopping", 2000, (2024, 1, 1)),
            income(5000, (2024, 1, 15)),
            expense("Shopping", 4000, (2024, 3, 1)),
        ];
        let months = monthly_totals(&txs);
        assert_eq!(months.len(), 3);
        assert_eq!((months[0].year, months[0].month, months[0].expense), (2023, 12, 1000));
        assert_eq!((months[1].income, months[1].expense), (5000, 2000));
        assert_eq!((months[2].year, months[2].month), (2024, 3));
    }

    #[test]
    fn test_daily_average_spans_inclusive_days() {
        let txs = vec![
            expense("Shopping", 1000, (2024, 1, 1)),
            expense("Shopping", 3000, (2024, 1, 4)),
            income(99999, (2024, 2, 1)),
        ];
        assert_eq!(daily_average_spending(&txs), 1000.0);
        assert_eq!(daily_average_spending(&[income(100, (2024, 1, 1))]), 0.0);
    }

    #[test]
    fn test_detect_anomalies_flags_outlier() {
        let mut txs: Vec<Transaction> = (1..=9)
            .map(|day| expense("Shopping", 1000 + day as Cents, (2024, 1, day)))
            .collect();
        txs.push(expense("Electronics", 250000, (2024, 1, 20)));

        let anomalies = detect_anomalies(&txs, 2.0);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].transaction.category, "Electronics");
        assert!(anomalies[0].z_score > 2.0);
    }

    #[test]
    fn test_detect_anomalies_needs_enough_samples() {
        let txs = vec![
            expense("Shopping", 100, (2024, 1, 1)),
            expense("Shopping", 100, (2024, 1, 2)),
            expense("Shopping", 100000, (2024, 1, 3)),
        ];
        assert!(detect_anomalies(&txs, 1.0).is_empty());
    }

    #[test]
    fn test_detect_anomalies_identical_amounts() {
        let txs: Vec<Transaction> = (1..=6)
            .map(|day| expense("Shopping", 500, (2024, 1, day)))
            .collect();
        assert!(detect_anomalies(&txs, 0.5).is_empty());
    }

    #[test]
    fn test_forecast_uses_last_three_months() {
        let month = |m: u32, expense: Cents| MonthlyTotals {
            year: 2024,
            month: m,
            income: 0,
            expense,
        };
        let trend = vec![month(1, 90000), month(2, 1000), month(3, 2000), month(4, 3000)];
        assert_eq!(forecast_next_month(&trend), 2000.0);
        assert_eq!(forecast_next_month(&trend[..1]), 90000.0);
        assert_eq!(forecast_next_month(&[]), 0.0);
    }

    #[test]
    fn test_summarize() {
        let txs = vec![
            expense("Shopping", 1000, (2024, 1, 1)),
            expense("Shopping", 3000, (2024, 1, 2)),
            expense("Rent", 8000, (2024, 1, 3)),
            expense("Rent", 2000, (2024, 1, 4)),
            income(20000, (2024, 1, 5)),
        ];
        let summary = summarize(&txs);
        assert_eq!(summary.total_expenses, 14000);
        assert_eq!(summary.total_income, 20000);
        assert_eq!(summary.net_balance, 6000);
        assert_eq!(summary.avg_expense, 3500.0);
        assert_eq!(summary.median_expense, 2500.0);
        assert_eq!(summary.transaction_count, 5);
        assert_eq!(summary.expense_count, 4);
        assert_eq!(summary.income_count, 1);
        assert_eq!(summarize(&[]), StatisticsSummary::default());
    }
}
