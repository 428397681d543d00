// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use fintrack::application::FinanceService;
use fintrack::domain::{Cents, Owner, Transaction, TransactionType};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(FinanceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = FinanceService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service with one logged-in owner
pub async fn test_service_with_owner() -> Result<(FinanceService, Owner, TempDir)> {
    let (service, temp_dir) = test_service().await?;
    let owner = service.login_or_create("owner@example.com").await?;
    Ok((service, owner, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Record an expense without a description
pub async fn expense(
    service: &FinanceService,
    owner: &Owner,
    category: &str,
    amount: Cents,
    date: &str,
) -> Result<Transaction> {
    Ok(service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            category,
            amount,
            parse_date(date),
            None,
        )
        .await?)
}

/// Record an income without a description
pub async fn income(
    service: &FinanceService,
    owner: &Owner,
    category: &str,
    amount: Cents,
    date: &str,
) -> Result<Transaction> {
    Ok(service
        .add_transaction(
            owner.id,
            TransactionType::Income,
            category,
            amount,
            parse_date(date),
            None,
        )
        .await?)
}
