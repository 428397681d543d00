use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Budget, BudgetId, BudgetProgress, BudgetType, Cents, OwnerId, month_bounds,
    normalize_category_name,
};

use super::{AppError, FinanceService};

/// A budget together with its progress for the budget's own month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub progress: BudgetProgress,
}

fn period(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    month_bounds(year, month)
        .ok_or_else(|| AppError::Validation(format!("Invalid budget period: {year}-{month:02}")))
}

fn validate_limit(amount_cents: Cents) -> Result<(), AppError> {
    if amount_cents < 0 {
        return Err(AppError::Validation(
            "Budget amount cannot be negative".to_string(),
        ));
    }
    Ok(())
}

impl FinanceService {
    // ========================
    // Budget operations
    // ========================

    /// Set the limit for a category in one month, defaulting to the current
    /// month. Returns the stored budget and whether it was newly created.
    pub async fn set_budget(
        &self,
        owner_id: OwnerId,
        category: &str,
        amount_cents: Cents,
        budget_type: BudgetType,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<(Budget, bool), AppError> {
        validate_limit(amount_cents)?;
        let category = normalize_category_name(category)
            .ok_or_else(|| AppError::Validation("Category name cannot be empty".to_string()))?;

        let today = Utc::now();
        let month = month.unwrap_or_else(|| today.month());
        let year = year.unwrap_or_else(|| today.year());
        period(year, month)?;

        let budget = Budget::new(owner_id, category, month, year, amount_cents, budget_type);
        let (budget, created) = self.repo.upsert_budget(&budget).await?;
        info!(
            %owner_id,
            category = %budget.category,
            year,
            month,
            amount_cents,
            created,
            "set budget"
        );
        Ok((budget, created))
    }

    /// Spending against the category's budget for one month. Without a budget
    /// the limit is 0.
    pub async fn budget_progress(
        &self,
        owner_id: OwnerId,
        category: &str,
        month: u32,
        year: i32,
    ) -> Result<BudgetProgress, AppError> {
        let (start, end) = period(year, month)?;
        let category = category.trim();

        let limit = self
            .repo
            .get_budget(owner_id, category, month, year)
            .await?
            .map(|budget| budget.amount_cents)
            .unwrap_or(0);
        let spent = self
            .repo
            .sum_expenses_for_category(owner_id, category, start, end)
            .await?;

        Ok(BudgetProgress::compute(limit, spent))
    }

    /// List budgets, optionally restricted to a month and/or year.
    pub async fn list_budgets(
        &self,
        owner_id: OwnerId,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Budget>, AppError> {
        Ok(self.repo.list_budgets(owner_id, month, year).await?)
    }

    /// Every budget of a month with its progress.
    pub async fn budget_overview(
        &self,
        owner_id: OwnerId,
        month: u32,
        year: i32,
    ) -> Result<Vec<BudgetStatus>, AppError> {
        let (start, end) = period(year, month)?;
        let budgets = self.repo.list_budgets(owner_id, Some(month), Some(year)).await?;

        let mut statuses = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let spent = self
                .repo
                .sum_expenses_for_category(owner_id, &budget.category, start, end)
                .await?;
            statuses.push(BudgetStatus {
                progress: BudgetProgress::compute(budget.amount_cents, spent),
                budget,
            });
        }
        Ok(statuses)
    }

    /// Change a budget's limit. Returns whether a budget was updated.
    pub async fn update_budget_amount(
        &self,
        owner_id: OwnerId,
        id: BudgetId,
        amount_cents: Cents,
    ) -> Result<bool, AppError> {
        validate_limit(amount_cents)?;
        let updated = self
            .repo
            .update_budget_amount(owner_id, id, amount_cents)
            .await?;
        if updated {
            info!(%owner_id, %id, amount_cents, "updated budget amount");
        }
        Ok(updated)
    }

    /// Delete a budget. Returns whether anything was removed.
    pub async fn delete_budget(&self, owner_id: OwnerId, id: BudgetId) -> Result<bool, AppError> {
        let deleted = self.repo.delete_budget(owner_id, id).await?;
        if deleted {
            info!(%owner_id, %id, "deleted budget");
        }
        Ok(deleted)
    }
}
