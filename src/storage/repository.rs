use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Budget, BudgetId, Category, CategoryId, Cents, DeleteStrategy, Owner,
    OwnerDeletion, OwnerId, Transaction, TransactionFilter, TransactionId, TransactionPatch,
    TransactionType,
};

use super::MIGRATION_001_INITIAL;

const CATEGORY_COLUMNS: &str = "id, owner_id, category_type, name, created_at, last_modified";

const TRANSACTION_COLUMNS: &str = "id, owner_id, transaction_type, category, amount_cents, date, description, created_at, last_modified";

const BUDGET_COLUMNS: &str =
    "id, owner_id, category, month, year, amount_cents, budget_type, created_at, updated_at";

/// Rows touched by a category deletion, besides the category itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRemoval {
    pub transactions: u64,
    pub budgets: u64,
}

/// Repository for persisting and querying owners, categories, transactions and budgets.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database {database_url}"))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes. Safe to run on an existing database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize the store (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every pooled connection. The repository is unusable afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Owner operations
    // ========================

    pub async fn save_owner(&self, owner: &Owner) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, is_active, created_at, last_modified)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner.id.to_string())
        .bind(&owner.email)
        .bind(owner.is_active)
        .bind(encode_ts(&owner.created_at))
        .bind(encode_ts(&owner.last_modified))
        .execute(&self.pool)
        .await
        .context("Failed to save owner")?;
        Ok(())
    }

    pub async fn get_owner_by_email(&self, email: &str) -> Result<Option<Owner>> {
        let row = sqlx::query(
            "SELECT id, email, is_active, created_at, last_modified FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch owner by email")?;

        row.as_ref().map(Self::row_to_owner).transpose()
    }

    /// Flip an active owner to inactive. Returns false when the owner is
    /// missing or already inactive.
    pub async fn deactivate_owner(&self, id: OwnerId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_active = 0, last_modified = ? WHERE id = ? AND is_active = 1",
        )
        .bind(encode_ts(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to deactivate owner")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an owner with all their transactions and budgets and every
    /// category whose name is not in `keep_categories`, in one transaction.
    pub async fn delete_owner_with_data(
        &self,
        id: OwnerId,
        keep_categories: &[&str],
    ) -> Result<OwnerDeletion> {
        let owner_id = id.to_string();
        let mut db_tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let transactions = sqlx::query("DELETE FROM transactions WHERE owner_id = ?")
            .bind(&owner_id)
            .execute(&mut *db_tx)
            .await
            .context("Failed to delete owner transactions")?
            .rows_affected();

        let budgets = sqlx::query("DELETE FROM budgets WHERE owner_id = ?")
            .bind(&owner_id)
            .execute(&mut *db_tx)
            .await
            .context("Failed to delete owner budgets")?
            .rows_affected();

        let mut category_sql = String::from("DELETE FROM categories WHERE owner_id = ?");
        if !keep_categories.is_empty() {
            let placeholders = vec!["?"; keep_categories.len()].join(", ");
            category_sql.push_str(&format!(" AND name NOT IN ({placeholders})"));
        }
        let mut category_query = sqlx::query(&category_sql).bind(&owner_id);
        for name in keep_categories {
            category_query = category_query.bind(*name);
        }
        let categories = category_query
            .execute(&mut *db_tx)
            .await
            .context("Failed to delete owner categories")?
            .rows_affected();

        let owners = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&owner_id)
            .execute(&mut *db_tx)
            .await
            .context("Failed to delete owner")?
            .rows_affected();

        db_tx.commit().await.context("Failed to commit owner deletion")?;

        Ok(OwnerDeletion {
            owner_deleted: owners > 0,
            transactions_deleted: transactions,
            budgets_deleted: budgets,
            categories_deleted: categories,
        })
    }

    fn row_to_owner(row: &SqliteRow) -> Result<Owner> {
        Ok(Owner {
            id: decode_uuid(row.get("id"), "owner ID")?,
            email: row.get("email"),
            is_active: row.get::<i64, _>("is_active") != 0,
            created_at: decode_ts(row.get("created_at"), "created_at")?,
            last_modified: decode_ts(row.get("last_modified"), "last_modified")?,
        })
    }

    // ========================
    // Category operations
    // ========================

    /// Insert the category, or only touch `last_modified` when (owner, type,
    /// name) already exists. Returns the stored row and whether it was new.
    pub async fn upsert_category(&self, category: &Category) -> Result<(Category, bool)> {
        let sql = format!(
            r#"
            INSERT INTO categories ({CATEGORY_COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (owner_id, category_type, name)
            DO UPDATE SET last_modified = excluded.last_modified
            RETURNING {CATEGORY_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(category.id.to_string())
            .bind(category.owner_id.to_string())
            .bind(category.category_type.as_str())
            .bind(&category.name)
            .bind(encode_ts(&category.created_at))
            .bind(encode_ts(&category.last_modified))
            .fetch_one(&self.pool)
            .await
            .context("Failed to upsert category")?;

        let stored = Self::row_to_category(&row)?;
        let inserted = stored.id == category.id;
        Ok((stored, inserted))
    }

    pub async fn get_category(&self, owner_id: OwnerId, id: CategoryId) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ? AND owner_id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch category")?;

        row.as_ref().map(Self::row_to_category).transpose()
    }

    pub async fn find_category(
        &self,
        owner_id: OwnerId,
        category_type: TransactionType,
        name: &str,
    ) -> Result<Option<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE owner_id = ? AND category_type = ? AND name = ?"
        );
        let row = sqlx::query(&sql)
            .bind(owner_id.to_string())
            .bind(category_type.as_str())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to find category")?;

        row.as_ref().map(Self::row_to_category).transpose()
    }

    /// List an owner's categories, newest first.
    pub async fn list_categories(
        &self,
        owner_id: OwnerId,
        category_type: Option<TransactionType>,
    ) -> Result<Vec<Category>> {
        let mut sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE owner_id = ?");
        if category_type.is_some() {
            sql.push_str(" AND category_type = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut query = sqlx::query(&sql).bind(owner_id.to_string());
        if let Some(kind) = category_type {
            query = query.bind(kind.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    pub async fn count_transactions_for_category(
        &self,
        owner_id: OwnerId,
        category_type: TransactionType,
        name: &str,
    ) -> Result<u64> {
        let count: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM transactions
            WHERE owner_id = ? AND transaction_type = ? AND category = ?
            "#,
        )
        .bind(owner_id.to_string())
        .bind(category_type.as_str())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count category transactions")?
        .get("count");

        Ok(count as u64)
    }

    pub async fn count_budgets_for_category(&self, owner_id: OwnerId, name: &str) -> Result<u64> {
        let count: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM budgets WHERE owner_id = ? AND category = ?")
                .bind(owner_id.to_string())
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count category budgets")?
                .get("count");

        Ok(count as u64)
    }

    /// Write a new type/name onto a category and move the transactions
    /// tagged with its old name along with it. Returns the number of
    /// transactions moved.
    pub async fn rename_category(
        &self,
        current: &Category,
        new_type: TransactionType,
        new_name: &str,
    ) -> Result<u64> {
        let now = encode_ts(&Utc::now());
        let owner_id = current.owner_id.to_string();
        let mut db_tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            UPDATE categories
            SET category_type = ?, name = ?, last_modified = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(new_type.as_str())
        .bind(new_name)
        .bind(&now)
        .bind(current.id.to_string())
        .bind(&owner_id)
        .execute(&mut *db_tx)
        .await
        .context("Failed to update category")?;

        let mut renamed = 0;
        if current.name != new_name {
            renamed = sqlx::query(
                r#"
                UPDATE transactions
                SET category = ?, last_modified = ?
                WHERE owner_id = ? AND transaction_type = ? AND category = ?
                "#,
            )
            .bind(new_name)
            .bind(&now)
            .bind(&owner_id)
            .bind(current.category_type.as_str())
            .bind(&current.name)
            .execute(&mut *db_tx)
            .await
            .context("Failed to rename category on transactions")?
            .rows_affected();
        }

        db_tx.commit().await.context("Failed to commit category update")?;
        Ok(renamed)
    }

    /// Delete a category and settle its references according to `strategy`,
    /// all in one transaction. `Block` leaves references untouched; callers
    /// check for them first. Returns `None` without side effects when the
    /// category does not exist.
    pub async fn delete_category(
        &self,
        owner_id: OwnerId,
        category_type: TransactionType,
        name: &str,
        strategy: DeleteStrategy,
        fallback: &str,
    ) -> Result<Option<CategoryRemoval>> {
        let owner_id = owner_id.to_string();
        let mut db_tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let deleted = sqlx::query(
            "DELETE FROM categories WHERE owner_id = ? AND category_type = ? AND name = ?",
        )
        .bind(&owner_id)
        .bind(category_type.as_str())
        .bind(name)
        .execute(&mut *db_tx)
        .await
        .context("Failed to delete category")?
        .rows_affected();

        if deleted == 0 {
            db_tx.rollback().await.context("Failed to roll back")?;
            return Ok(None);
        }

        let mut removal = CategoryRemoval {
            transactions: 0,
            budgets: 0,
        };

        if strategy != DeleteStrategy::Block {
            removal.transactions = match strategy {
                DeleteStrategy::Reassign => sqlx::query(
                    r#"
                    UPDATE transactions
                    SET category = ?, last_modified = ?
                    WHERE owner_id = ? AND transaction_type = ? AND category = ?
                    "#,
                )
                .bind(fallback)
                .bind(encode_ts(&Utc::now()))
                .bind(&owner_id)
                .bind(category_type.as_str())
                .bind(name)
                .execute(&mut *db_tx)
                .await
                .context("Failed to reassign category transactions")?
                .rows_affected(),
                _ => sqlx::query(
                    "DELETE FROM transactions WHERE owner_id = ? AND transaction_type = ? AND category = ?",
                )
                .bind(&owner_id)
                .bind(category_type.as_str())
                .bind(name)
                .execute(&mut *db_tx)
                .await
                .context("Failed to delete category transactions")?
                .rows_affected(),
            };

            removal.budgets = sqlx::query("DELETE FROM budgets WHERE owner_id = ? AND category = ?")
                .bind(&owner_id)
                .bind(name)
                .execute(&mut *db_tx)
                .await
                .context("Failed to delete category budgets")?
                .rows_affected();
        }

        db_tx.commit().await.context("Failed to commit category deletion")?;
        Ok(Some(removal))
    }

    fn row_to_category(row: &SqliteRow) -> Result<Category> {
        let category_type: String = row.get("category_type");

        Ok(Category {
            id: decode_uuid(row.get("id"), "category ID")?,
            owner_id: decode_uuid(row.get("owner_id"), "owner ID")?,
            category_type: category_type.parse().context("Invalid category type")?,
            name: row.get("name"),
            created_at: decode_ts(row.get("created_at"), "created_at")?,
            last_modified: decode_ts(row.get("last_modified"), "last_modified")?,
        })
    }

    // ========================
    // Transaction operations
    // ========================

    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        let sql = format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(transaction.id.to_string())
            .bind(transaction.owner_id.to_string())
            .bind(transaction.transaction_type.as_str())
            .bind(&transaction.category)
            .bind(transaction.amount_cents)
            .bind(encode_ts(&transaction.date))
            .bind(&transaction.description)
            .bind(encode_ts(&transaction.created_at))
            .bind(encode_ts(&transaction.last_modified))
            .execute(&self.pool)
            .await
            .context("Failed to save transaction")?;
        Ok(())
    }

    pub async fn get_transaction(
        &self,
        owner_id: OwnerId,
        id: TransactionId,
    ) -> Result<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ? AND owner_id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// List an owner's transactions matching every clause set on `filter`,
    /// newest-created first.
    pub async fn list_transactions(
        &self,
        owner_id: OwnerId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        // Build query dynamically based on filters
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE owner_id = ?");

        let start_str = filter.start_date.as_ref().map(encode_ts);
        let end_str = filter.end_date.as_ref().map(encode_ts);

        if filter.transaction_type.is_some() {
            sql.push_str(" AND transaction_type = ?");
        }
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.min_amount.is_some() {
            sql.push_str(" AND amount_cents >= ?");
        }
        if filter.max_amount.is_some() {
            sql.push_str(" AND amount_cents <= ?");
        }
        if start_str.is_some() {
            sql.push_str(" AND date >= ?");
        }
        if end_str.is_some() {
            sql.push_str(" AND date <= ?");
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut query = sqlx::query(&sql).bind(owner_id.to_string());
        if let Some(kind) = filter.transaction_type {
            query = query.bind(kind.as_str());
        }
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(min) = filter.min_amount {
            query = query.bind(min);
        }
        if let Some(max) = filter.max_amount {
            query = query.bind(max);
        }
        if let Some(start) = &start_str {
            query = query.bind(start);
        }
        if let Some(end) = &end_str {
            query = query.bind(end);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        // SQLite's LOWER() only folds ASCII, so the text search runs here
        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            let tx = Self::row_to_transaction(row)?;
            if filter.matches_search(&tx) {
                transactions.push(tx);
            }
        }
        Ok(transactions)
    }

    /// Apply the fields set on `patch` and bump `last_modified`. Returns false
    /// when no transaction with this id belongs to the owner.
    pub async fn update_transaction(
        &self,
        owner_id: OwnerId,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<bool> {
        let mut sql = String::from("UPDATE transactions SET last_modified = ?");
        if patch.transaction_type.is_some() {
            sql.push_str(", transaction_type = ?");
        }
        if patch.category.is_some() {
            sql.push_str(", category = ?");
        }
        if patch.amount_cents.is_some() {
            sql.push_str(", amount_cents = ?");
        }
        if patch.date.is_some() {
            sql.push_str(", date = ?");
        }
        if patch.description.is_some() {
            sql.push_str(", description = ?");
        }
        sql.push_str(" WHERE id = ? AND owner_id = ?");

        let mut query = sqlx::query(&sql).bind(encode_ts(&Utc::now()));
        if let Some(kind) = patch.transaction_type {
            query = query.bind(kind.as_str());
        }
        if let Some(category) = &patch.category {
            query = query.bind(category);
        }
        if let Some(amount) = patch.amount_cents {
            query = query.bind(amount);
        }
        if let Some(date) = &patch.date {
            query = query.bind(encode_ts(date));
        }
        if let Some(description) = &patch.description {
            query = query.bind(description);
        }

        let result = query
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update transaction")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_transaction(&self, owner_id: OwnerId, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Sum an owner's expenses in a category with `from <= date < to`.
    pub async fn sum_expenses_for_category(
        &self,
        owner_id: OwnerId,
        category: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM transactions
            WHERE owner_id = ? AND transaction_type = ? AND category = ? AND date >= ? AND date < ?
            "#,
        )
        .bind(owner_id.to_string())
        .bind(TransactionType::Expense.as_str())
        .bind(category)
        .bind(encode_ts(&from))
        .bind(encode_ts(&to))
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum category expenses")?;

        Ok(row.get("total"))
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let transaction_type: String = row.get("transaction_type");

        Ok(Transaction {
            id: decode_uuid(row.get("id"), "transaction ID")?,
            owner_id: decode_uuid(row.get("owner_id"), "owner ID")?,
            transaction_type: transaction_type
                .parse()
                .context("Invalid transaction type")?,
            category: row.get("category"),
            amount_cents: row.get("amount_cents"),
            date: decode_ts(row.get("date"), "date")?,
            description: row.get("description"),
            created_at: decode_ts(row.get("created_at"), "created_at")?,
            last_modified: decode_ts(row.get("last_modified"), "last_modified")?,
        })
    }

    // ========================
    // Budget operations
    // ========================

    /// Insert the budget, or overwrite amount and type of the existing
    /// (owner, category, month, year) row keeping its `created_at`.
    /// Returns the stored row and whether it was new.
    pub async fn upsert_budget(&self, budget: &Budget) -> Result<(Budget, bool)> {
        let sql = format!(
            r#"
            INSERT INTO budgets ({BUDGET_COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (owner_id, category, year, month)
            DO UPDATE SET
                amount_cents = excluded.amount_cents,
                budget_type = excluded.budget_type,
                updated_at = excluded.updated_at
            RETURNING {BUDGET_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(budget.id.to_string())
            .bind(budget.owner_id.to_string())
            .bind(&budget.category)
            .bind(i64::from(budget.month))
            .bind(i64::from(budget.year))
            .bind(budget.amount_cents)
            .bind(budget.budget_type.as_str())
            .bind(encode_ts(&budget.created_at))
            .bind(encode_ts(&budget.updated_at))
            .fetch_one(&self.pool)
            .await
            .context("Failed to upsert budget")?;

        let stored = Self::row_to_budget(&row)?;
        let inserted = stored.id == budget.id;
        Ok((stored, inserted))
    }

    pub async fn get_budget(
        &self,
        owner_id: OwnerId,
        category: &str,
        month: u32,
        year: i32,
    ) -> Result<Option<Budget>> {
        let sql = format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE owner_id = ? AND category = ? AND month = ? AND year = ?"
        );
        let row = sqlx::query(&sql)
            .bind(owner_id.to_string())
            .bind(category)
            .bind(i64::from(month))
            .bind(i64::from(year))
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch budget")?;

        row.as_ref().map(Self::row_to_budget).transpose()
    }

    /// List an owner's budgets ordered by period, then category.
    pub async fn list_budgets(
        &self,
        owner_id: OwnerId,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Budget>> {
        let mut sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE owner_id = ?");
        if month.is_some() {
            sql.push_str(" AND month = ?");
        }
        if year.is_some() {
            sql.push_str(" AND year = ?");
        }
        sql.push_str(" ORDER BY year, month, category");

        let mut query = sqlx::query(&sql).bind(owner_id.to_string());
        if let Some(month) = month {
            query = query.bind(i64::from(month));
        }
        if let Some(year) = year {
            query = query.bind(i64::from(year));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list budgets")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    pub async fn update_budget_amount(
        &self,
        owner_id: OwnerId,
        id: BudgetId,
        amount_cents: Cents,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE budgets SET amount_cents = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(amount_cents)
        .bind(encode_ts(&Utc::now()))
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update budget")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_budget(&self, owner_id: OwnerId, id: BudgetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_budget(row: &SqliteRow) -> Result<Budget> {
        let budget_type: String = row.get("budget_type");
        let month: i64 = row.get("month");
        let year: i64 = row.get("year");

        Ok(Budget {
            id: decode_uuid(row.get("id"), "budget ID")?,
            owner_id: decode_uuid(row.get("owner_id"), "owner ID")?,
            category: row.get("category"),
            month: u32::try_from(month).context("Invalid budget month")?,
            year: i32::try_from(year).context("Invalid budget year")?,
            amount_cents: row.get("amount_cents"),
            budget_type: budget_type.parse().context("Invalid budget type")?,
            created_at: decode_ts(row.get("created_at"), "created_at")?,
            updated_at: decode_ts(row.get("updated_at"), "updated_at")?,
        })
    }
}

/// Fixed-width UTC timestamps so that string comparison in SQL is chronological.
fn encode_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(value: String, field: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&value)
        .with_context(|| format!("Invalid {field} timestamp"))?
        .with_timezone(&Utc))
}

fn decode_uuid(value: String, field: &str) -> Result<Uuid> {
    Uuid::parse_str(&value).with_context(|| format!("Invalid {field}"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_encoded_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(encode_ts(&earlier) < encode_ts(&later));
        assert_eq!(encode_ts(&earlier), "2024-01-31T23:59:59.000000Z");
    }

    #[test]
    fn test_timestamp_decode_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(decode_ts(encode_ts(&ts), "date").unwrap(), ts);
        assert!(decode_ts("yesterday".to_string(), "date").is_err());
    }
}
