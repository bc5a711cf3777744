use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Account, AccountId, TransactionRecord, format_timestamp};

/// Full ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<TransactionRecord>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the transaction log (one account or all) to CSV, in insertion order.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        writer: W,
        account_id: Option<AccountId>,
    ) -> Result<usize> {
        let transactions = self.service.list_transactions(account_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "sequence",
            "id",
            "account_id",
            "kind",
            "amount",
            "description",
            "balance_after",
            "created_at",
        ])?;

        for tx in &transactions {
            csv_writer.write_record(&[
                tx.sequence.to_string(),
                tx.id.to_string(),
                tx.account_id.to_string(),
                tx.kind.as_str().to_string(),
                tx.amount.to_string(),
                tx.description.clone(),
                tx.balance_after.to_string(),
                format_timestamp(&tx.created_at),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export account balances to CSV.
    pub async fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account_id", "limit", "balance"])?;
        for account in &accounts {
            csv_writer.write_record(&[
                account.id.to_string(),
                account.limit.to_string(),
                account.balance.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }

    /// Export accounts and their logs as a JSON snapshot, for one account or all.
    pub async fn export_full_json<W: Write>(
        &self,
        mut writer: W,
        account_id: Option<AccountId>,
    ) -> Result<LedgerSnapshot> {
        let accounts = match account_id {
            Some(id) => vec![self.service.get_account(id).await?],
            None => self.service.list_accounts().await?,
        };

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts,
            transactions: self.service.list_transactions(account_id).await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
