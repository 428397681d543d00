use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OwnerId, ParseKindError, TransactionType};

pub type CategoryId = Uuid;

/// Category that absorbs transactions of a deleted category under the
/// `reassign` strategy. Seeded for both transaction types.
pub const FALLBACK_CATEGORY: &str = "Others";

pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] =
    &["Shopping", "Transportation", "Entertainment", FALLBACK_CATEGORY];

pub const DEFAULT_INCOME_CATEGORIES: &[&str] = &["Wage", FALLBACK_CATEGORY];

/// Every (type, name) pair seeded for a new owner.
pub fn default_categories() -> impl Iterator<Item = (TransactionType, &'static str)> {
    DEFAULT_EXPENSE_CATEGORIES
        .iter()
        .map(|name| (TransactionType::Expense, *name))
        .chain(
            DEFAULT_INCOME_CATEGORIES
                .iter()
                .map(|name| (TransactionType::Income, *name)),
        )
}

/// Distinct default names. Categories with these names survive owner deletion.
pub fn default_category_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = default_categories().map(|(_, name)| name).collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Trim a user-supplied category name; `None` if nothing is left.
pub fn normalize_category_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub owner_id: OwnerId,
    pub category_type: TransactionType,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Category {
    pub fn new(owner_id: OwnerId, category_type: TransactionType, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_type,
            name: name.into(),
            created_at: now,
            last_modified: now,
        }
    }
}

/// What happens to transactions and budgets still referencing a category
/// that is being deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteStrategy {
    /// Refuse while anything references the category
    #[default]
    Block,
    /// Move transactions to the fallback category, drop budgets
    Reassign,
    /// Drop referencing transactions and budgets
    Cascade,
}

impl DeleteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteStrategy::Block => "block",
            DeleteStrategy::Reassign => "reassign",
            DeleteStrategy::Cascade => "cascade",
        }
    }
}

impl std::str::FromStr for DeleteStrategy {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "block" => Ok(DeleteStrategy::Block),
            "reassign" => Ok(DeleteStrategy::Reassign),
            "cascade" => Ok(DeleteStrategy::Cascade),
            _ => Err(ParseKindError {
                kind: "delete strategy",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DeleteStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of deleting a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDeletion {
    pub deleted: bool,
    pub affected_transactions: u64,
    pub affected_budgets: u64,
    pub strategy: DeleteStrategy,
    pub message: String,
}

impl CategoryDeletion {
    pub fn not_found(strategy: DeleteStrategy) -> Self {
        Self {
            deleted: false,
            affected_transactions: 0,
            affected_budgets: 0,
            strategy,
            message: "Category not found or already deleted.".to_string(),
        }
    }

    pub fn completed(strategy: DeleteStrategy, transactions: u64, budgets: u64) -> Self {
        let message = match strategy {
            DeleteStrategy::Block => "Category deleted.".to_string(),
            DeleteStrategy::Reassign => format!(
                "Category deleted; {} transactions moved to '{}', {} budgets removed.",
                transactions, FALLBACK_CATEGORY, budgets
            ),
            DeleteStrategy::Cascade => format!(
                "Category deleted with {} transactions and {} budgets.",
                transactions, budgets
            ),
        };
        Self {
            deleted: true,
            affected_transactions: transactions,
            affected_budgets: budgets,
            strategy,
            message,
        }
    }
}

/// Outcome of renaming or retyping a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub category: Category,
    /// False when the requested type and name equal the current ones
    pub updated: bool,
    /// Transactions moved from the old name to the new one
    pub renamed_transactions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_include_fallback_for_both_types() {
        let defaults: Vec<_> = default_categories().collect();
        assert!(defaults.contains(&(TransactionType::Expense, FALLBACK_CATEGORY)));
        assert!(defaults.contains(&(TransactionType::Income, FALLBACK_CATEGORY)));
        assert_eq!(defaults.len(), 6);
    }

    #[test]
    fn test_default_category_names_are_distinct() {
        let names = default_category_names();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"Others"));
    }

    #[test]
    fn test_normalize_category_name() {
        assert_eq!(normalize_category_name("  Food "), Some("Food".to_string()));
        assert_eq!(normalize_category_name("   "), None);
    }

    #[test]
    fn test_delete_strategy_parse() {
        assert_eq!("Cascade".parse::<DeleteStrategy>(), Ok(DeleteStrategy::Cascade));
        assert_eq!(DeleteStrategy::default(), DeleteStrategy::Block);
        assert!("purge".parse::<DeleteStrategy>().is_err());
    }

    #[test]
    fn test_deletion_messages() {
        let outcome = CategoryDeletion::completed(DeleteStrategy::Reassign, 3, 1);
        assert!(outcome.deleted);
        assert!(outcome.message.contains("3 transactions moved to 'Others'"));
        assert!(!CategoryDeletion::not_found(DeleteStrategy::Cascade).deleted);
    }
}
