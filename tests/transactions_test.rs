mod common;

use anyhow::Result;
use common::{expense, income, parse_date, test_service_with_owner};
use fintrack::application::AppError;
use fintrack::domain::{TransactionFilter, TransactionPatch, TransactionType};

#[tokio::test]
async fn test_add_and_get_transaction() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;

    let tx = service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            4599,
            parse_date("2024-02-10"),
            Some("New shoes".to_string()),
        )
        .await?;

    let fetched = service.get_transaction(owner.id, tx.id).await?;
    assert_eq!(fetched.category, "Shopping");
    assert_eq!(fetched.amount_cents, 4599);
    assert_eq!(fetched.date, parse_date("2024-02-10"));
    assert_eq!(fetched.description.as_deref(), Some("New shoes"));

    Ok(())
}

#[tokio::test]
async fn test_add_rejects_non_positive_amount() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;

    for amount in [0, -100] {
        let result = service
            .add_transaction(
                owner.id,
                TransactionType::Expense,
                "Shopping",
                amount,
                parse_date("2024-02-10"),
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    Ok(())
}

#[tokio::test]
async fn test_add_with_unknown_category_leaves_store_unchanged() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;

    let result = expense(&service, &owner, "Yachts", 100, "2024-02-10").await;
    let err = result.unwrap_err().downcast::<AppError>()?;
    assert!(matches!(err, AppError::InvalidCategory { .. }));

    // "Wage" exists, but only for income
    let result = expense(&service, &owner, "Wage", 100, "2024-02-10").await;
    assert!(result.is_err());

    let all = service
        .list_transactions(owner.id, &TransactionFilter::default())
        .await?;
    assert!(all.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_get_transaction_of_other_owner_is_not_found() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;
    let other = service.login_or_create("other@example.com").await?;
    let tx = expense(&service, &owner, "Shopping", 100, "2024-02-10").await?;

    let result = service.get_transaction(other.id, tx.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_list_filters_are_conjunctive() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;

    service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            2000,
            parse_date("2024-01-10"),
            Some("Weekly GROCERIES run".to_string()),
        )
        .await?;
    service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            9000,
            parse_date("2024-01-20"),
            Some("groceries and wine".to_string()),
        )
        .await?;
    expense(&service, &owner, "Transportation", 3000, "2024-01-15").await?;
    income(&service, &owner, "Wage", 250000, "2024-01-31").await?;

    let all = service
        .list_transactions(owner.id, &TransactionFilter::default())
        .await?;
    assert_eq!(all.len(), 4);

    let expenses = service
        .list_transactions(owner.id, &TransactionFilter::expenses())
        .await?;
    assert_eq!(expenses.len(), 3);

    let search = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                search_text: Some("Groceries".into()),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert_eq!(search.len(), 2);

    let narrowed = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                search_text: Some("groceries".into()),
                max_amount: Some(5000),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].amount_cents, 2000);

    // Amount bounds are inclusive
    let bounded = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                min_amount: Some(3000),
                max_amount: Some(9000),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert_eq!(bounded.len(), 2);

    // Date bounds are inclusive
    let dated = service
        .list_transactions(
            owner.id,
            &TransactionFilter::between(
                Some(parse_date("2024-01-15")),
                Some(parse_date("2024-01-20")),
            ),
        )
        .await?;
    assert_eq!(dated.len(), 2);

    let by_category = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                transaction_type: Some(TransactionType::Expense),
                category: Some("Transportation".into()),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert_eq!(by_category.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_list_search_treats_wildcards_literally() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;

    service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            1000,
            parse_date("2024-01-10"),
            Some("50% off sale".to_string()),
        )
        .await?;
    service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            1000,
            parse_date("2024-01-11"),
            Some("500 pens".to_string()),
        )
        .await?;

    let result = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                search_text: Some("50%".into()),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].description.as_deref(), Some("50% off sale"));

    Ok(())
}

#[tokio::test]
async fn test_list_is_newest_created_first_and_owner_scoped() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;
    let other = service.login_or_create("other@example.com").await?;

    let first = expense(&service, &owner, "Shopping", 100, "2024-03-01").await?;
    let second = expense(&service, &owner, "Shopping", 200, "2023-01-01").await?;
    expense(&service, &other, "Shopping", 300, "2024-03-01").await?;

    let mine = service
        .list_transactions(owner.id, &TransactionFilter::default())
        .await?;
    let ids: Vec<_> = mine.iter().map(|tx| tx.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    Ok(())
}

#[tokio::test]
async fn test_update_transaction_fields() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;
    let tx = service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            1000,
            parse_date("2024-03-01"),
            Some("socks".to_string()),
        )
        .await?;
    let before = service.get_transaction(owner.id, tx.id).await?;

    let updated = service
        .update_transaction(
            owner.id,
            tx.id,
            TransactionPatch {
                amount_cents: Some(1500),
                date: Some(parse_date("2024-03-02")),
                description: Some(None),
                ..TransactionPatch::default()
            },
        )
        .await?;
    assert!(updated);

    let after = service.get_transaction(owner.id, tx.id).await?;
    assert_eq!(after.amount_cents, 1500);
    assert_eq!(after.date, parse_date("2024-03-02"));
    assert_eq!(after.description, None);
    assert_eq!(after.category, "Shopping");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.last_modified >= before.last_modified);

    Ok(())
}

#[tokio::test]
async fn test_update_revalidates_category_and_type() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;
    let tx = expense(&service, &owner, "Shopping", 1000, "2024-03-01").await?;

    // Switching to income while keeping an expense-only category
    let result = service
        .update_transaction(
            owner.id,
            tx.id,
            TransactionPatch {
                transaction_type: Some(TransactionType::Income),
                ..TransactionPatch::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidCategory { .. })));

    // Switching type and category together is fine
    let updated = service
        .update_transaction(
            owner.id,
            tx.id,
            TransactionPatch {
                transaction_type: Some(TransactionType::Income),
                category: Some("Wage".into()),
                ..TransactionPatch::default()
            },
        )
        .await?;
    assert!(updated);
    let after = service.get_transaction(owner.id, tx.id).await?;
    assert_eq!(after.transaction_type, TransactionType::Income);
    assert_eq!(after.category, "Wage");

    let result = service
        .update_transaction(
            owner.id,
            tx.id,
            TransactionPatch {
                amount_cents: Some(0),
                ..TransactionPatch::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_of_foreign_id_are_noops() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;
    let other = service.login_or_create("other@example.com").await?;
    let tx = expense(&service, &owner, "Shopping", 1000, "2024-03-01").await?;

    let updated = service
        .update_transaction(
            other.id,
            tx.id,
            TransactionPatch {
                amount_cents: Some(1),
                ..TransactionPatch::default()
            },
        )
        .await?;
    assert!(!updated);
    assert!(!service.delete_transaction(other.id, tx.id).await?);
    assert_eq!(service.get_transaction(owner.id, tx.id).await?.amount_cents, 1000);

    assert!(service.delete_transaction(owner.id, tx.id).await?);
    assert!(!service.delete_transaction(owner.id, tx.id).await?);

    Ok(())
}

#[tokio::test]
async fn test_list_search_folds_non_ascii_case() -> Result<()> {
    let (service, owner, _temp) = test_service_with_owner().await?;

    service
        .add_transaction(
            owner.id,
            TransactionType::Expense,
            "Shopping",
            12000,
            parse_date("2024-09-01"),
            Some("ÉCOLE fees".to_string()),
        )
        .await?;
    expense(&service, &owner, "Shopping", 500, "2024-09-02").await?;

    let result = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                search_text: Some("école".into()),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].description.as_deref(), Some("ÉCOLE fees"));

    // Other clauses still apply alongside the text search
    let result = service
        .list_transactions(
            owner.id,
            &TransactionFilter {
                search_text: Some("École".into()),
                min_amount: Some(20000),
                ..TransactionFilter::default()
            },
        )
        .await?;
    assert!(result.is_empty());

    Ok(())
}
