use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Cents, ParseAmountError};

pub type TransactionId = Uuid;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "c")]
    Credit,
    #[serde(rename = "d")]
    Debit,
}

impl TransactionKind {
    /// Single-letter code used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "c",
            TransactionKind::Debit => "d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "c" => Some(TransactionKind::Credit),
            "d" => Some(TransactionKind::Debit),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated request to move money on one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub amount: Cents,
    pub kind: TransactionKind,
    pub description: String,
}

impl NewTransaction {
    /// Validate raw inputs.
    ///
    /// The description is kept as given. Once trimmed it must be between 1 and
    /// `MAX_DESCRIPTION_LEN` characters long.
    pub fn new(
        amount: Cents,
        kind: &str,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount));
        }

        let kind = TransactionKind::from_str(kind)
            .ok_or_else(|| ValidationError::UnknownKind(kind.to_string()))?;

        let description = description.into();
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankDescription);
        }
        let len = trimmed.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong(len));
        }

        Ok(Self {
            amount,
            kind,
            description,
        })
    }
}

/// An applied, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    /// Insertion order, assigned by the store
    pub sequence: i64,
    pub account_id: AccountId,
    pub amount: Cents,
    pub kind: TransactionKind,
    pub description: String,
    /// Account balance right after this entry was applied
    pub balance_after: Cents,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record for an accepted transaction. Sequence is assigned on insert.
    pub fn new(account_id: AccountId, tx: &NewTransaction, balance_after: Cents) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            account_id,
            amount: tx.amount,
            kind: tx.kind,
            description: tx.description.clone(),
            balance_after,
            created_at: Utc::now(),
        }
    }

    /// Signed effect on the balance.
    pub fn delta(&self) -> Cents {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}

/// Render a timestamp as UTC ISO-8601 with microsecond precision,
/// e.g. `2024-01-17T02:34:41.217753Z`. Fixed width, so it also sorts as text.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAmount(ParseAmountError),
    NonPositiveAmount(Cents),
    UnknownKind(String),
    BlankDescription,
    DescriptionTooLong(usize),
    MalformedBody(String),
    InvalidAccountId(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAmount(e) => write!(f, "{}", e),
            ValidationError::NonPositiveAmount(amount) => {
                write!(f, "amount must be positive, got {}", amount)
            }
            ValidationError::UnknownKind(kind) => {
                write!(f, "kind must be 'c' or 'd', got '{}'", kind)
            }
            ValidationError::BlankDescription => write!(f, "description must not be blank"),
            ValidationError::DescriptionTooLong(len) => write!(
                f,
                "description must be at most {} characters, got {}",
                MAX_DESCRIPTION_LEN, len
            ),
            ValidationError::MalformedBody(msg) => write!(f, "malformed request: {}", msg),
            ValidationError::InvalidAccountId(raw) => {
                write!(f, "account id must be an integer, got '{}'", raw)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ParseAmountError> for ValidationError {
    fn from(e: ParseAmountError) -> Self {
        ValidationError::InvalidAmount(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(TransactionKind::from_str("c"), Some(TransactionKind::Credit));
        assert_eq!(TransactionKind::from_str("d"), Some(TransactionKind::Debit));
        assert_eq!(TransactionKind::from_str("C"), None);
        assert_eq!(TransactionKind::from_str("credit"), None);
    }

    #[test]
    fn test_valid_transaction() {
        let tx = NewTransaction::new(100, "d", "rent").unwrap();
        assert_eq!(tx.amount, 100);
        assert_eq!(tx.kind, TransactionKind::Debit);
        assert_eq!(tx.description, "rent");
    }

    #[test]
    fn test_description_bounds() {
        assert!(NewTransaction::new(1, "c", "a").is_ok());
        assert!(NewTransaction::new(1, "c", "abcdefghij").is_ok());
        assert_eq!(
            NewTransaction::new(1, "c", "abcdefghijk"),
            Err(ValidationError::DescriptionTooLong(11))
        );
        assert_eq!(
            NewTransaction::new(1, "c", "   "),
            Err(ValidationError::BlankDescription)
        );
        assert_eq!(
            NewTransaction::new(1, "c", ""),
            Err(ValidationError::BlankDescription)
        );
    }

    #[test]
    fn test_description_length_ignores_surrounding_whitespace() {
        let tx = NewTransaction::new(1, "c", " abcdefghij ").unwrap();
        assert_eq!(tx.description, " abcdefghij ");
        assert!(NewTransaction::new(1, "c", "\tx\n").is_ok());
        assert_eq!(
            NewTransaction::new(1, "c", "  abcdefghijk  "),
            Err(ValidationError::DescriptionTooLong(11))
        );
    }

    #[test]
    fn test_description_counts_characters_not_bytes() {
        assert!(NewTransaction::new(1, "c", "café café").is_ok());
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert_eq!(
            NewTransaction::new(0, "c", "x"),
            Err(ValidationError::NonPositiveAmount(0))
        );
        assert!(NewTransaction::new(-5, "d", "x").is_err());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert_eq!(
            NewTransaction::new(1, "x", "desc"),
            Err(ValidationError::UnknownKind("x".into()))
        );
    }

    #[test]
    fn test_record_delta() {
        let credit = NewTransaction::new(250, "c", "in").unwrap();
        let debit = NewTransaction::new(250, "d", "out").unwrap();
        assert_eq!(TransactionRecord::new(1, &credit, 250).delta(), 250);
        assert_eq!(TransactionRecord::new(1, &debit, 0).delta(), -250);
    }

    #[test]
    fn test_format_timestamp_has_microseconds() {
        let ts = DateTime::parse_from_rfc3339("2024-01-17T02:34:41.217753Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&ts), "2024-01-17T02:34:41.217753Z");

        let whole = DateTime::parse_from_rfc3339("2024-01-17T02:34:41Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&whole), "2024-01-17T02:34:41.000000Z");
    }
}
