use anyhow::Context;

use crate::domain::{
    Account, AccountId, Cents, IntegrityReport, NewTransaction, STATEMENT_SIZE, Statement,
    TransactionRecord, reconcile,
};
use crate::storage::{Repository, StoreOptions};

use super::{AccountLocks, AppError};

/// Application service providing the ledger's operations.
/// This is the primary interface for any client (HTTP API, CLI).
pub struct LedgerService {
    repo: Repository,
    locks: AccountLocks,
}

/// Result of an accepted transaction
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub limit: Cents,
    pub balance: Cents,
    pub record: TransactionRecord,
}

impl LedgerService {
    /// Create a ledger service over a migrated repository.
    /// Reads the provisioned accounts once to build the lock table.
    pub async fn open(repo: Repository) -> Result<Self, AppError> {
        let accounts = repo.list_accounts().await?;
        let locks = AccountLocks::new(accounts.iter().map(|a| a.id));
        tracing::debug!(accounts = locks.len(), "ledger service opened");
        Ok(Self { repo, locks })
    }

    /// Create (if needed) and migrate the database at the given path, then open it.
    pub async fn init(database_path: &str, options: &StoreOptions) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url, options).await?;
        Self::open(repo).await
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str, options: &StoreOptions) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url, options).await?;
        Self::open(repo).await
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Account operations
    // ========================

    /// Get an account by id.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))
    }

    /// List all provisioned accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Apply a credit or debit to an account.
    ///
    /// Writers to the same account are serialized: first on the account's mutex,
    /// then on the store's write lock inside a single store transaction. The
    /// balance update and the ledger row commit together or not at all.
    pub async fn submit_transaction(
        &self,
        account_id: AccountId,
        tx: NewTransaction,
    ) -> Result<TransactionReceipt, AppError> {
        let _guard = self
            .locks
            .acquire(account_id)
            .await
            .ok_or(AppError::AccountNotFound(account_id))?;

        let mut db_tx = self.repo.begin().await?;

        let account = Repository::lock_account(&mut *db_tx, account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;

        // Rejection drops db_tx, which rolls back.
        let balance = account.apply(tx.kind, tx.amount)?;

        let mut record = TransactionRecord::new(account.id, &tx, balance);
        Repository::save_transaction(&mut *db_tx, &mut record).await?;

        db_tx
            .commit()
            .await
            .context("Failed to commit transaction")?;

        tracing::debug!(
            account_id,
            kind = %record.kind,
            amount = record.amount,
            balance,
            sequence = record.sequence,
            "transaction applied"
        );

        Ok(TransactionReceipt {
            limit: account.limit,
            balance,
            record,
        })
    }

    /// Current balance, limit and the latest transactions for an account.
    /// Unlocked read: a concurrent writer may land just after the snapshot.
    pub async fn get_statement(&self, account_id: AccountId) -> Result<Statement, AppError> {
        let account = self.get_account(account_id).await?;
        let recent = self
            .repo
            .recent_transactions(account_id, STATEMENT_SIZE)
            .await?;
        Ok(Statement::new(account, recent))
    }

    /// List transactions in insertion order, optionally for one account.
    pub async fn list_transactions(
        &self,
        account_id: Option<AccountId>,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        match account_id {
            Some(id) => {
                let account = self.get_account(id).await?;
                Ok(self.repo.list_transactions_for_account(account.id).await?)
            }
            None => Ok(self.repo.list_transactions().await?),
        }
    }

    // ========================
    // Integrity operations
    // ========================

    /// Replay every account's log and compare it with the stored balances.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let accounts = self.repo.list_accounts().await?;
        let mut reconciliations = Vec::with_capacity(accounts.len());

        for account in &accounts {
            let log = self.repo.list_transactions_for_account(account.id).await?;
            let result = reconcile(account, &log);
            if !result.is_consistent() {
                tracing::warn!(
                    account_id = account.id,
                    issues = result.issues.len(),
                    "account failed reconciliation"
                );
            }
            reconciliations.push(result);
        }

        Ok(IntegrityReport {
            accounts: reconciliations,
        })
    }
}
