use serde::{Deserialize, Serialize};

use super::{Cents, TransactionKind};

pub type AccountId = i64;

/// A pre-provisioned customer account.
///
/// `limit` is the overdraft allowance: the balance may go negative down to `-limit`,
/// never further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub limit: Cents,
    pub balance: Cents,
}

impl Account {
    pub fn new(id: AccountId, limit: Cents) -> Self {
        Self {
            id,
            limit,
            balance: 0,
        }
    }

    /// Lowest balance this account may reach.
    pub fn floor(&self) -> Cents {
        -self.limit
    }

    pub fn is_within_limit(&self) -> bool {
        self.balance >= self.floor()
    }

    /// Compute the balance that results from applying a movement.
    /// Does not mutate the account; the caller persists the result.
    pub fn apply(&self, kind: TransactionKind, amount: Cents) -> Result<Cents, BalanceError> {
        match kind {
            TransactionKind::Credit => {
                self.balance
                    .checked_add(amount)
                    .ok_or(BalanceError::Overflow {
                        account_id: self.id,
                        balance: self.balance,
                        amount,
                    })
            }
            // A debit that underflows i64 is always past the floor.
            TransactionKind::Debit => match self.balance.checked_sub(amount) {
                Some(balance) if balance >= self.floor() => Ok(balance),
                _ => Err(BalanceError::Overdraft(Overdraft {
                    account_id: self.id,
                    balance: self.balance,
                    limit: self.limit,
                    amount,
                })),
            },
        }
    }
}

/// Why a movement could not be applied to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    Overdraft(Overdraft),
    /// A credit that would not fit in the balance
    Overflow {
        account_id: AccountId,
        balance: Cents,
        amount: Cents,
    },
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::Overdraft(o) => write!(f, "{}", o),
            BalanceError::Overflow {
                account_id,
                balance,
                amount,
            } => write!(
                f,
                "credit of {} cents would overflow the balance {} of account {}",
                amount, balance, account_id
            ),
        }
    }
}

/// A debit that would take the balance past the overdraft limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overdraft {
    pub account_id: AccountId,
    pub balance: Cents,
    pub limit: Cents,
    pub amount: Cents,
}

impl std::fmt::Display for Overdraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "debit of {} cents would take account {} from {} below its limit of -{}",
            self.amount, self.account_id, self.balance, self.limit
        )
    }
}
