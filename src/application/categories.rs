use tracing::{info, warn};

use crate::domain::{
    Category, CategoryDeletion, CategoryId, CategoryUpdate, DeleteStrategy, FALLBACK_CATEGORY,
    OwnerId, TransactionType, default_categories, normalize_category_name,
};

use super::{AppError, FinanceService};

fn validated_name(name: &str) -> Result<String, AppError> {
    normalize_category_name(name)
        .ok_or_else(|| AppError::Validation("Category name cannot be empty".to_string()))
}

impl FinanceService {
    // ========================
    // Category operations
    // ========================

    /// Create a category, or touch it if (owner, type, name) already exists.
    /// Returns the stored category and whether it was newly created.
    pub async fn upsert_category(
        &self,
        owner_id: OwnerId,
        category_type: TransactionType,
        name: &str,
    ) -> Result<(Category, bool), AppError> {
        let name = validated_name(name)?;
        let (category, created) = self
            .repo
            .upsert_category(&Category::new(owner_id, category_type, name))
            .await?;
        if created {
            info!(%owner_id, %category_type, name = %category.name, "created category");
        }
        Ok((category, created))
    }

    /// List an owner's categories, optionally of one type.
    pub async fn list_categories(
        &self,
        owner_id: OwnerId,
        category_type: Option<TransactionType>,
    ) -> Result<Vec<Category>, AppError> {
        Ok(self.repo.list_categories(owner_id, category_type).await?)
    }

    /// Ensure every default category exists for the owner. Returns how many
    /// were missing.
    pub async fn seed_default_categories(&self, owner_id: OwnerId) -> Result<usize, AppError> {
        let mut created = 0;
        for (category_type, name) in default_categories() {
            if self.upsert_category(owner_id, category_type, name).await?.1 {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Rename and/or retype a category. A rename is carried over to every
    /// transaction tagged with the old name; a type change is refused while
    /// any transaction still uses the category.
    pub async fn update_category(
        &self,
        owner_id: OwnerId,
        id: CategoryId,
        new_type: TransactionType,
        new_name: &str,
    ) -> Result<CategoryUpdate, AppError> {
        let current = self
            .repo
            .get_category(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
        let new_name = validated_name(new_name)?;

        if current.category_type == new_type && current.name == new_name {
            return Ok(CategoryUpdate {
                category: current,
                updated: false,
                renamed_transactions: 0,
            });
        }

        let duplicate = self
            .repo
            .find_category(owner_id, new_type, &new_name)
            .await?
            .filter(|existing| existing.id != current.id);
        if duplicate.is_some() {
            return Err(AppError::DuplicateName {
                category_type: new_type,
                name: new_name,
            });
        }

        if current.category_type != new_type {
            let affected = self
                .repo
                .count_transactions_for_category(owner_id, current.category_type, &current.name)
                .await?;
            if affected > 0 {
                warn!(%owner_id, category = %current.name, affected, "category type change blocked");
                return Err(AppError::TypeChangeBlocked { affected });
            }
        }

        let renamed_transactions = self.repo.rename_category(&current, new_type, &new_name).await?;
        info!(
            %owner_id,
            from = %current.name,
            to = %new_name,
            renamed_transactions,
            "updated category"
        );

        let category = self
            .repo
            .get_category(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

        Ok(CategoryUpdate {
            category,
            updated: true,
            renamed_transactions,
        })
    }

    /// Delete a category, settling the transactions and budgets that still
    /// reference it according to `strategy`.
    pub async fn delete_category(
        &self,
        owner_id: OwnerId,
        category_type: TransactionType,
        name: &str,
        strategy: DeleteStrategy,
    ) -> Result<CategoryDeletion, AppError> {
        let name = validated_name(name)?;

        if self
            .repo
            .find_category(owner_id, category_type, &name)
            .await?
            .is_none()
        {
            return Ok(CategoryDeletion::not_found(strategy));
        }

        match strategy {
            DeleteStrategy::Block => {
                let transactions = self
                    .repo
                    .count_transactions_for_category(owner_id, category_type, &name)
                    .await?;
                let budgets = self.repo.count_budgets_for_category(owner_id, &name).await?;
                if transactions + budgets > 0 {
                    warn!(%owner_id, category = %name, transactions, budgets, "category deletion blocked");
                    return Err(AppError::DeletionBlocked {
                        transactions,
                        budgets,
                    });
                }
            }
            DeleteStrategy::Reassign => {
                if name == FALLBACK_CATEGORY {
                    return Err(AppError::Validation(format!(
                        "Cannot reassign '{FALLBACK_CATEGORY}' to itself"
                    )));
                }
                self.upsert_category(owner_id, category_type, FALLBACK_CATEGORY)
                    .await?;
            }
            DeleteStrategy::Cascade => {}
        }

        let Some(removal) = self
            .repo
            .delete_category(owner_id, category_type, &name, strategy, FALLBACK_CATEGORY)
            .await?
        else {
            return Ok(CategoryDeletion::not_found(strategy));
        };

        info!(
            %owner_id,
            category = %name,
            %strategy,
            transactions = removal.transactions,
            budgets = removal.budgets,
            "deleted category"
        );
        Ok(CategoryDeletion::completed(
            strategy,
            removal.transactions,
            removal.budgets,
        ))
    }
}
