use thiserror::Error;

use crate::domain::TransactionType;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Category already exists: {category_type} '{name}'")]
    DuplicateName {
        category_type: TransactionType,
        name: String,
    },

    #[error("Category '{name}' does not exist for {category_type} transactions")]
    InvalidCategory {
        category_type: TransactionType,
        name: String,
    },

    #[error("Cannot change category type: {affected} transactions still use it")]
    TypeChangeBlocked { affected: u64 },

    #[error(
        "Cannot delete category: {transactions} transactions and {budgets} budgets still reference it"
    )]
    DeletionBlocked { transactions: u64, budgets: u64 },

    #[error("Account is deactivated: {0}")]
    AccountDeactivated(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
