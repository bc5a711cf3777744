mod common;

use anyhow::Result;
use common::{SMALL_ACCOUNT, credit, debit, small_account_service, test_service};
use overdraft_ledger::application::AppError;
use overdraft_ledger::domain::{STATEMENT_SIZE, TransactionKind};

#[tokio::test]
async fn test_default_accounts_are_provisioned() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let accounts = service.list_accounts().await?;
    let limits: Vec<_> = accounts.iter().map(|a| (a.id, a.limit)).collect();
    assert_eq!(
        limits,
        vec![
            (1, 100000),
            (2, 80000),
            (3, 1000000),
            (4, 10000000),
            (5, 500000)
        ]
    );
    assert!(accounts.iter().all(|a| a.balance == 0));

    Ok(())
}

#[tokio::test]
async fn test_overdraft_example() -> Result<()> {
    let (service, _temp) = small_account_service().await?;

    let receipt = service
        .submit_transaction(SMALL_ACCOUNT, debit(500, "rent"))
        .await?;
    assert_eq!(receipt.balance, -500);
    assert_eq!(receipt.limit, 1000);

    let rejected = service
        .submit_transaction(SMALL_ACCOUNT, debit(600, "tv"))
        .await;
    assert!(matches!(
        rejected,
        Err(AppError::OverdraftExceeded {
            balance: -500,
            limit: 1000,
            amount: 600,
            ..
        })
    ));

    let receipt = service
        .submit_transaction(SMALL_ACCOUNT, credit(100, "refund"))
        .await?;
    assert_eq!(receipt.balance, -400);

    let account = service.get_account(SMALL_ACCOUNT).await?;
    assert_eq!(account.balance, -400);

    Ok(())
}

#[tokio::test]
async fn test_debit_to_exact_limit_is_accepted() -> Result<()> {
    let (service, _temp) = small_account_service().await?;

    let receipt = service
        .submit_transaction(SMALL_ACCOUNT, debit(1000, "all"))
        .await?;
    assert_eq!(receipt.balance, -1000);

    let rejected = service.submit_transaction(SMALL_ACCOUNT, debit(1, "one")).await;
    assert!(matches!(rejected, Err(AppError::OverdraftExceeded { .. })));

    Ok(())
}

#[tokio::test]
async fn test_rejected_debit_leaves_no_trace() -> Result<()> {
    let (service, _temp) = small_account_service().await?;

    let _ = service
        .submit_transaction(SMALL_ACCOUNT, debit(5000, "too much"))
        .await;

    let account = service.get_account(SMALL_ACCOUNT).await?;
    assert_eq!(account.balance, 0);
    let log = service.list_transactions(Some(SMALL_ACCOUNT)).await?;
    assert!(log.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_credit_overflow_is_rejected_without_trace() -> Result<()> {
    let (service, _temp) = small_account_service().await?;

    service
        .submit_transaction(SMALL_ACCOUNT, credit(i64::MAX, "max"))
        .await?;

    let rejected = service
        .submit_transaction(SMALL_ACCOUNT, credit(1, "one"))
        .await;
    assert!(matches!(
        rejected,
        Err(AppError::BalanceOverflow {
            balance: i64::MAX,
            amount: 1,
            ..
        })
    ));

    let account = service.get_account(SMALL_ACCOUNT).await?;
    assert_eq!(account.balance, i64::MAX);
    assert_eq!(service.list_transactions(Some(SMALL_ACCOUNT)).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unknown_account_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let submitted = service.submit_transaction(6, credit(10, "x")).await;
    assert!(matches!(submitted, Err(AppError::AccountNotFound(6))));

    let statement = service.get_statement(6).await;
    assert!(matches!(statement, Err(AppError::AccountNotFound(6))));

    let statement = service.get_statement(0).await;
    assert!(matches!(statement, Err(AppError::AccountNotFound(0))));

    Ok(())
}

#[tokio::test]
async fn test_transaction_records_balance_snapshot() -> Result<()> {
    let (service, _temp) = small_account_service().await?;

    service
        .submit_transaction(SMALL_ACCOUNT, credit(300, "a"))
        .await?;
    service
        .submit_transaction(SMALL_ACCOUNT, debit(800, "b"))
        .await?;
    service
        .submit_transaction(SMALL_ACCOUNT, credit(50, "c"))
        .await?;

    let log = service.list_transactions(Some(SMALL_ACCOUNT)).await?;
    let snapshots: Vec<_> = log.iter().map(|t| t.balance_after).collect();
    assert_eq!(snapshots, vec![300, -500, -450]);

    let sequences: Vec<_> = log.iter().map(|t| t.sequence).collect();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));

    Ok(())
}

#[tokio::test]
async fn test_statement_for_fresh_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let statement = service.get_statement(2).await?;
    assert_eq!(statement.account.balance, 0);
    assert_eq!(statement.account.limit, 80000);
    assert!(statement.recent.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_statement_returns_latest_ten_newest_first() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for i in 1..=12 {
        service
            .submit_transaction(1, credit(i, &format!("tx{}", i)))
            .await?;
    }

    let statement = service.get_statement(1).await?;
    assert_eq!(statement.recent.len(), STATEMENT_SIZE);
    assert_eq!(statement.account.balance, (1..=12).sum::<i64>());

    let amounts: Vec<_> = statement.recent.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3]);
    assert!(
        statement
            .recent
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at)
    );
    assert_eq!(statement.recent[0].description, "tx12");
    assert_eq!(statement.recent[0].kind, TransactionKind::Credit);

    Ok(())
}

#[tokio::test]
async fn test_statement_only_includes_own_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.submit_transaction(1, credit(10, "one")).await?;
    service.submit_transaction(2, debit(20, "two")).await?;

    let statement = service.get_statement(2).await?;
    assert_eq!(statement.recent.len(), 1);
    assert_eq!(statement.recent[0].description, "two");
    assert_eq!(statement.account.balance, -20);

    Ok(())
}

#[tokio::test]
async fn test_balance_reconciles_with_log() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let moves = [
        (1, credit(1000, "in")),
        (1, debit(5000, "out")),
        (3, debit(999999, "big")),
        (3, credit(1, "tiny")),
        (5, debit(500000, "max")),
    ];
    for (account, tx) in moves {
        service.submit_transaction(account, tx).await?;
    }
    // Rejected: would pass the limit
    assert!(service.submit_transaction(5, debit(1, "over")).await.is_err());

    let report = service.check_integrity().await?;
    assert!(report.is_healthy(), "report: {:?}", report);

    for rec in &report.accounts {
        assert_eq!(rec.balance, rec.computed_balance);
    }
    let account5 = service.get_account(5).await?;
    assert_eq!(account5.balance, -500000);

    Ok(())
}

#[tokio::test]
async fn test_integrity_check_detects_tampering() -> Result<()> {
    let (service, temp) = small_account_service().await?;

    service
        .submit_transaction(SMALL_ACCOUNT, debit(200, "x"))
        .await?;

    let db_path = temp.path().join("test.db");
    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", db_path.to_str().unwrap())).await?;
    sqlx::query("UPDATE accounts SET balance = 0 WHERE id = ?")
        .bind(SMALL_ACCOUNT)
        .execute(&pool)
        .await?;
    pool.close().await;

    let report = service.check_integrity().await?;
    assert!(!report.is_healthy());
    assert_eq!(report.issue_count(), 1);

    Ok(())
}
