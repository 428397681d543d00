use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{
    Cents, OwnerId, Transaction, TransactionFilter, TransactionId, TransactionPatch,
    TransactionType, normalize_category_name,
};

use super::{AppError, FinanceService};

fn validate_amount(amount_cents: Cents) -> Result<(), AppError> {
    if amount_cents <= 0 {
        return Err(AppError::Validation("Amount must be positive".to_string()));
    }
    Ok(())
}

impl FinanceService {
    // ========================
    // Transaction operations
    // ========================

    /// Fails with `InvalidCategory` when (type, category) is not registered for the owner.
    async fn ensure_category(
        &self,
        owner_id: OwnerId,
        transaction_type: TransactionType,
        category: &str,
    ) -> Result<(), AppError> {
        if self
            .repo
            .find_category(owner_id, transaction_type, category)
            .await?
            .is_none()
        {
            return Err(AppError::InvalidCategory {
                category_type: transaction_type,
                name: category.to_string(),
            });
        }
        Ok(())
    }

    /// Record a new transaction in an existing category of matching type.
    pub async fn add_transaction(
        &self,
        owner_id: OwnerId,
        transaction_type: TransactionType,
        category: &str,
        amount_cents: Cents,
        date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        validate_amount(amount_cents)?;
        let category = category.trim();
        self.ensure_category(owner_id, transaction_type, category)
            .await?;

        let mut transaction =
            Transaction::new(owner_id, transaction_type, category, amount_cents, date);
        if let Some(desc) = description {
            transaction = transaction.with_description(desc);
        }

        self.repo.save_transaction(&transaction).await?;
        info!(
            %owner_id,
            id = %transaction.id,
            %transaction_type,
            category = %transaction.category,
            amount_cents,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Query an owner's transactions, newest first.
    pub async fn list_transactions(
        &self,
        owner_id: OwnerId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions(owner_id, filter).await?)
    }

    /// Get a single transaction owned by the caller.
    pub async fn get_transaction(
        &self,
        owner_id: OwnerId,
        id: TransactionId,
    ) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))
    }

    /// Apply a partial update. Returns `false` if the id does not belong to
    /// the owner.
    pub async fn update_transaction(
        &self,
        owner_id: OwnerId,
        id: TransactionId,
        mut patch: TransactionPatch,
    ) -> Result<bool, AppError> {
        let Some(current) = self.repo.get_transaction(owner_id, id).await? else {
            return Ok(false);
        };

        if let Some(amount) = patch.amount_cents {
            validate_amount(amount)?;
        }
        if let Some(category) = &patch.category {
            patch.category = Some(normalize_category_name(category).ok_or_else(|| {
                AppError::Validation("Category name cannot be empty".to_string())
            })?);
        }
        if let Some(description) = patch.description.take() {
            patch.description = Some(description.filter(|d| !d.trim().is_empty()));
        }

        if patch.touches_category() {
            let transaction_type = patch.transaction_type.unwrap_or(current.transaction_type);
            let category = patch.category.as_deref().unwrap_or(&current.category);
            self.ensure_category(owner_id, transaction_type, category)
                .await?;
        }

        let updated = self.repo.update_transaction(owner_id, id, &patch).await?;
        if updated {
            info!(%owner_id, %id, "updated transaction");
        }
        Ok(updated)
    }

    /// Delete a transaction. Returns whether anything was removed.
    pub async fn delete_transaction(
        &self,
        owner_id: OwnerId,
        id: TransactionId,
    ) -> Result<bool, AppError> {
        let deleted = self.repo.delete_transaction(owner_id, id).await?;
        if deleted {
            info!(%owner_id, %id, "deleted transaction");
        }
        Ok(deleted)
    }
}
