use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, TransactionKind, TransactionRecord, format_timestamp,
};

use super::MIGRATION_001_INITIAL;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_connections: u32,
    /// How long a request waits for a free connection before giving up
    pub acquire_timeout: Duration,
    /// How long a connection waits on SQLite's write lock
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(10),
        }
    }
}

/// Repository for persisting and querying accounts and their transactions.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database.
    /// Pass `?mode=rwc` in the URL to create the file if it doesn't exist.
    pub async fn connect(database_url: &str, options: &StoreOptions) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(options.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str, options: &StoreOptions) -> Result<Self> {
        let repo = Self::connect(database_url, options).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Account operations
    // ========================

    /// Provision an account. Accounts are never created over the API; this is
    /// for seeding and tooling.
    pub async fn provision_account(&self, account: &Account) -> Result<()> {
        sqlx::query("INSERT INTO accounts (id, credit_limit, balance) VALUES (?, ?, ?)")
            .bind(account.id)
            .bind(account.limit)
            .bind(account.balance)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to provision account {}", account.id))?;
        Ok(())
    }

    /// Get an account without locking it.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, credit_limit, balance FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account")?;

        Ok(row.as_ref().map(Self::row_to_account))
    }

    /// List all provisioned accounts, ordered by id.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query("SELECT id, credit_limit, balance FROM accounts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list accounts")?;

        Ok(rows.iter().map(Self::row_to_account).collect())
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Account {
        Account {
            id: row.get("id"),
            limit: row.get("credit_limit"),
            balance: row.get("balance"),
        }
    }

    // ========================
    // Locked write path
    // ========================

    /// Start a store transaction. Dropping it without commit rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    /// Read an account for update.
    ///
    /// The read is a no-op write so SQLite hands this transaction the write lock
    /// before the balance is seen. A plain SELECT would start a read snapshot that
    /// can no longer be upgraded once another writer commits.
    pub async fn lock_account(
        conn: &mut SqliteConnection,
        id: AccountId,
    ) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance
            WHERE id = ?
            RETURNING id, credit_limit, balance
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to lock account")?;

        Ok(row.as_ref().map(Self::row_to_account))
    }

    /// Write the new balance and append the transaction row.
    /// Assigns the record's sequence number.
    pub async fn save_transaction(
        conn: &mut SqliteConnection,
        record: &mut TransactionRecord,
    ) -> Result<()> {
        sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
            .bind(record.balance_after)
            .bind(record.account_id)
            .execute(&mut *conn)
            .await
            .context("Failed to update balance")?;

        let row = sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, amount, kind, description, balance_after, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING sequence
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.account_id)
        .bind(record.amount)
        .bind(record.kind.as_str())
        .bind(&record.description)
        .bind(record.balance_after)
        .bind(format_timestamp(&record.created_at))
        .fetch_one(&mut *conn)
        .await
        .context("Failed to save transaction")?;

        record.sequence = row.get("sequence");
        Ok(())
    }

    // ========================
    // Transaction queries
    // ========================

    /// Most recent transactions for an account, newest first.
    pub async fn recent_transactions(
        &self,
        account_id: AccountId,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT sequence, id, account_id, amount, kind, description, balance_after, created_at
            FROM transactions
            WHERE account_id = ?
            ORDER BY created_at DESC, sequence DESC
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch recent transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Full log for an account, in insertion order.
    pub async fn list_transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT sequence, id, account_id, amount, kind, description, balance_after, created_at
            FROM transactions
            WHERE account_id = ?
            ORDER BY sequence
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for account")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Every transaction in the ledger, in insertion order.
    pub async fn list_transactions(&self) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT sequence, id, account_id, amount, kind, description, balance_after, created_at
            FROM transactions
            ORDER BY sequence
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<TransactionRecord> {
        let id_str: String = row.get("id");
        let kind_str: String = row.get("kind");
        let created_at_str: String = row.get("created_at");

        Ok(TransactionRecord {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            sequence: row.get("sequence"),
            account_id: row.get("account_id"),
            amount: row.get("amount"),
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            description: row.get("description"),
            balance_after: row.get("balance_after"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
