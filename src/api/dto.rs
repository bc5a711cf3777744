//! Request/response bodies and their mapping to domain types.

use serde::{Deserialize, Serialize};

use crate::application::TransactionReceipt;
use crate::domain::{
    Cents, NewTransaction, ParseAmountError, Statement, TransactionKind, TransactionRecord,
    ValidationError, format_timestamp, parse_amount,
};

/// Amount as sent by clients: a JSON integer or an integer in a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Integer(i64),
    Text(String),
    /// Any other JSON number (fractional, or out of i64 range). Always rejected.
    Number(f64),
}

impl RawAmount {
    pub fn to_cents(&self) -> Result<Cents, ParseAmountError> {
        match self {
            RawAmount::Integer(n) => Ok(*n),
            RawAmount::Text(s) => parse_amount(s),
            RawAmount::Number(f) if f.fract() != 0.0 => Err(ParseAmountError::Fractional),
            RawAmount::Number(_) => Err(ParseAmountError::InvalidFormat),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    pub amount: RawAmount,
    pub kind: String,
    pub description: String,
}

impl TransactionRequest {
    pub fn into_new_transaction(self) -> Result<NewTransaction, ValidationError> {
        let amount = self.amount.to_cents()?;
        NewTransaction::new(amount, &self.kind, self.description)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub limit: Cents,
    pub balance: Cents,
}

impl From<&TransactionReceipt> for TransactionResponse {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            limit: receipt.limit,
            balance: receipt.balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    pub balance: BalanceView,
    pub last_transactions: Vec<StatementEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub total: Cents,
    pub statement_time: String,
    pub limit: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementEntry {
    pub amount: Cents,
    pub kind: TransactionKind,
    pub description: String,
    pub occurred_at: String,
}

impl From<&TransactionRecord> for StatementEntry {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            amount: record.amount,
            kind: record.kind,
            description: record.description.clone(),
            occurred_at: format_timestamp(&record.created_at),
        }
    }
}

impl From<&Statement> for StatementResponse {
    fn from(statement: &Statement) -> Self {
        Self {
            balance: BalanceView {
                total: statement.account.balance,
                statement_time: format_timestamp(&statement.generated_at),
                limit: statement.account.limit,
            },
            last_transactions: statement.recent.iter().map(StatementEntry::from).collect(),
        }
    }
}
