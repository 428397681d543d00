use tracing::{info, warn};

use crate::domain::{Owner, OwnerDeletion, OwnerId, default_category_names, normalize_email};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the tracker.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct FinanceService {
    pub(super) repo: Repository,
}

impl FinanceService {
    /// Create a new finance service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (creating if needed) and migrate the database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release the underlying store.
    pub async fn close(self) {
        self.repo.close().await;
    }

    // ========================
    // Owner lifecycle
    // ========================

    /// Look up an owner by email, creating an active one if none exists.
    /// Default categories are (re)seeded on every login.
    pub async fn login_or_create(&self, email: &str) -> Result<Owner, AppError> {
        let email = normalize_email(email)
            .ok_or_else(|| AppError::Validation(format!("Invalid email address: {email}")))?;

        let owner = match self.repo.get_owner_by_email(&email).await? {
            Some(owner) if !owner.is_active => {
                warn!(email = %owner.email, "login refused for deactivated account");
                return Err(AppError::AccountDeactivated(owner.email));
            }
            Some(owner) => owner,
            None => {
                let owner = Owner::new(email);
                self.repo.save_owner(&owner).await?;
                info!(owner_id = %owner.id, email = %owner.email, "created owner");
                owner
            }
        };

        self.seed_default_categories(owner.id).await?;
        Ok(owner)
    }

    /// Get an owner by email.
    pub async fn find_owner(&self, email: &str) -> Result<Owner, AppError> {
        let normalized = normalize_email(email).unwrap_or_else(|| email.trim().to_string());
        self.repo
            .get_owner_by_email(&normalized)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {email}")))
    }

    /// Mark an active owner inactive. Fails if the owner is missing or
    /// already inactive.
    pub async fn deactivate(&self, owner_id: OwnerId) -> Result<(), AppError> {
        if !self.repo.deactivate_owner(owner_id).await? {
            return Err(AppError::NotFound(format!("active user {owner_id}")));
        }
        info!(%owner_id, "deactivated owner");
        Ok(())
    }

    /// Delete an owner together with their transactions, budgets and custom
    /// categories. Categories named like a default are kept.
    pub async fn delete_with_data(&self, owner_id: OwnerId) -> Result<OwnerDeletion, AppError> {
        let keep = default_category_names();
        let deletion = self.repo.delete_owner_with_data(owner_id, &keep).await?;
        info!(
            %owner_id,
            transactions = deletion.transactions_deleted,
            budgets = deletion.budgets_deleted,
            categories = deletion.categories_deleted,
            "deleted owner data"
        );
        Ok(deletion)
    }
}
