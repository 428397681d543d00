use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OwnerId = Uuid;

/// A user of the tracker. Every transaction, category and budget belongs to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Owner {
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            is_active: true,
            created_at: now,
            last_modified: now,
        }
    }
}

/// Lower-cased, trimmed email used as the login key.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(email)
}

/// Counts of everything removed together with an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDeletion {
    pub owner_deleted: bool,
    pub transactions_deleted: u64,
    pub budgets_deleted: u64,
    pub categories_deleted: u64,
}

impl std::fmt::Display for OwnerDeletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Deleted: {} user, {} transactions, {} budgets, {} categories",
            u8::from(self.owner_deleted),
            self.transactions_deleted,
            self.budgets_deleted,
            self.categories_deleted
        )
    }
}
