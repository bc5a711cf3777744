use thiserror::Error;

use crate::domain::{AccountId, BalanceError, Cents, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "Overdraft limit exceeded on account {account_id}: balance {balance}, limit {limit}, debit {amount}"
    )]
    OverdraftExceeded {
        account_id: AccountId,
        balance: Cents,
        limit: Cents,
        amount: Cents,
    },

    #[error("Balance overflow on account {account_id}: balance {balance}, credit {amount}")]
    BalanceOverflow {
        account_id: AccountId,
        balance: Cents,
        amount: Cents,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Overdraft(o) => AppError::OverdraftExceeded {
                account_id: o.account_id,
                balance: o.balance,
                limit: o.limit,
                amount: o.amount,
            },
            BalanceError::Overflow {
                account_id,
                balance,
                amount,
            } => AppError::BalanceOverflow {
                account_id,
                balance,
                amount,
            },
        }
    }
}

impl AppError {
    /// True for rejections caused by the request itself rather than the store.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AppError::Database(_))
    }
}
