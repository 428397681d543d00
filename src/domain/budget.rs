use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, OwnerId, ParseKindError};

pub type BudgetId = Uuid;

/// Highest percentage reported for an overspent budget.
pub const MAX_PROGRESS_PERCENTAGE: f64 = 999.9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetType::Weekly => "weekly",
            BudgetType::Monthly => "monthly",
            BudgetType::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BudgetType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(BudgetType::Weekly),
            "monthly" => Ok(BudgetType::Monthly),
            "yearly" => Ok(BudgetType::Yearly),
            _ => Err(ParseKindError {
                kind: "budget type",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BudgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending limit for one category in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub owner_id: OwnerId,
    pub category: String,
    pub month: u32,
    pub year: i32,
    pub amount_cents: Cents,
    pub budget_type: BudgetType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        owner_id: OwnerId,
        category: impl Into<String>,
        month: u32,
        year: i32,
        amount_cents: Cents,
        budget_type: BudgetType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category: category.into(),
            month,
            year,
            amount_cents,
            budget_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Half-open range [first day of month, first day of next month) in UTC.
/// Returns `None` for a month outside 1..=12 or an unrepresentable year.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
        Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?),
    ))
}

/// Spending against a budget limit for one month. Always derived from the
/// current transactions, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    /// The limit; 0 when no budget exists
    pub budget: Cents,
    pub spent: Cents,
    pub remaining: Cents,
    pub percentage: f64,
}

impl BudgetProgress {
    pub fn compute(limit: Cents, spent: Cents) -> Self {
        let remaining = (limit - spent).max(0);
        let percentage = if limit > 0 {
            (spent as f64 / limit as f64 * 100.0).min(MAX_PROGRESS_PERCENTAGE)
        } else {
            0.0
        };
        Self {
            budget: limit,
            spent,
            remaining,
            percentage,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.budget > 0 && self.spent > self.budget
    }
}
