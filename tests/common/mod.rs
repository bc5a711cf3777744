// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use overdraft_ledger::application::LedgerService;
use overdraft_ledger::domain::{Account, AccountId, Cents, NewTransaction};
use overdraft_ledger::storage::{Repository, StoreOptions};
use tempfile::TempDir;

/// Account with a limit of 1000 and a zero balance, outside the default seed range
pub const SMALL_ACCOUNT: AccountId = 100;

/// Helper to create a test service over the default provisioned accounts
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), &StoreOptions::default()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service with extra accounts provisioned before startup
pub async fn test_service_with(
    accounts: &[(AccountId, Cents)],
) -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());

    let repo = Repository::init(&db_url, &StoreOptions::default()).await?;
    for (id, limit) in accounts {
        repo.provision_account(&Account::new(*id, *limit)).await?;
    }

    let service = LedgerService::open(repo).await?;
    Ok((service, temp_dir))
}

/// Service with `SMALL_ACCOUNT` (limit 1000) provisioned
pub async fn small_account_service() -> Result<(LedgerService, TempDir)> {
    test_service_with(&[(SMALL_ACCOUNT, 1000)]).await
}

pub fn debit(amount: Cents, description: &str) -> NewTransaction {
    NewTransaction::new(amount, "d", description).unwrap()
}

pub fn credit(amount: Cents, description: &str) -> NewTransaction {
    NewTransaction::new(amount, "c", description).unwrap()
}
