use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Cents, OwnerId};

pub type TransactionId = Uuid;

/// Direction of money flow. Categories are partitioned by the same two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionType {
    Expense,
    Income,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Expense",
            TransactionType::Income => "Income",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            _ => Err(ParseKindError {
                kind: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense entry owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: OwnerId,
    pub transaction_type: TransactionType,
    /// Name of a category of the same type belonging to the owner
    pub category: String,
    /// Always positive; the type carries the direction
    pub amount_cents: Cents,
    /// When the transaction happened in the real world
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        owner_id: OwnerId,
        transaction_type: TransactionType,
        category: impl Into<String>,
        amount_cents: Cents,
        date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            transaction_type,
            category: category.into(),
            amount_cents,
            date,
            description: None,
            created_at: now,
            last_modified: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }
}

/// Partial update of a transaction. `None` leaves a field untouched;
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub amount_cents: Option<Cents>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<Option<String>>,
}

impl TransactionPatch {
    /// True when the patch can break the category/type pairing and must be re-validated.
    pub fn touches_category(&self) -> bool {
        self.transaction_type.is_some() || self.category.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_type.is_none()
            && self.category.is_none()
            && self.amount_cents.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// Optional clauses for querying transactions. Every clause that is set is
/// AND-ed together; clauses left as `None` are not part of the predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    /// Inclusive lower bound on amount
    pub min_amount: Option<Cents>,
    /// Inclusive upper bound on amount
    pub max_amount: Option<Cents>,
    /// Inclusive lower bound on date
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on date
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the description
    pub search_text: Option<String>,
}

impl TransactionFilter {
    pub fn expenses() -> Self {
        Self {
            transaction_type: Some(TransactionType::Expense),
            ..Self::default()
        }
    }

    pub fn between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            start_date: start,
            end_date: end,
            ..Self::default()
        }
    }

    /// True when `search_text` is unset or occurs in the description,
    /// compared with full Unicode case folding.
    pub fn matches_search(&self, tx: &Transaction) -> bool {
        let Some(text) = self.search_text.as_deref() else {
            return true;
        };
        let needle = text.to_lowercase();
        tx.description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}
