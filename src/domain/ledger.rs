use super::{Account, AccountId, Cents, TransactionRecord};

/// Compute an account balance from its transaction log.
/// Accounts open at zero, so balance = sum of credits - sum of debits.
pub fn compute_balance(transactions: &[TransactionRecord]) -> Cents {
    transactions.iter().map(TransactionRecord::delta).sum()
}

/// A single inconsistency found while reconciling an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A row's stored balance disagrees with the running balance at that point
    SnapshotMismatch {
        sequence: i64,
        stored: Cents,
        expected: Cents,
    },
    /// The account's balance disagrees with the sum of its log
    BalanceMismatch { stored: Cents, computed: Cents },
    /// The balance sits below the overdraft floor
    LimitBreached { balance: Cents, limit: Cents },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::SnapshotMismatch {
                sequence,
                stored,
                expected,
            } => write!(
                f,
                "transaction #{} stores balance {} but the running balance is {}",
                sequence, stored, expected
            ),
            IntegrityIssue::BalanceMismatch { stored, computed } => write!(
                f,
                "account balance is {} but its transactions sum to {}",
                stored, computed
            ),
            IntegrityIssue::LimitBreached { balance, limit } => {
                write!(f, "balance {} is below the limit of -{}", balance, limit)
            }
        }
    }
}

/// Reconciliation result for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub account_id: AccountId,
    pub balance: Cents,
    pub computed_balance: Cents,
    pub transaction_count: usize,
    pub issues: Vec<IntegrityIssue>,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Replay an account's log in insertion order and compare it with what is stored.
///
/// `transactions` must hold the account's complete log sorted by sequence.
pub fn reconcile(account: &Account, transactions: &[TransactionRecord]) -> Reconciliation {
    let mut issues = Vec::new();
    let mut running: Cents = 0;

    for tx in transactions {
        running += tx.delta();
        if tx.balance_after != running {
            issues.push(IntegrityIssue::SnapshotMismatch {
                sequence: tx.sequence,
                stored: tx.balance_after,
                expected: running,
            });
        }
    }

    if account.balance != running {
        issues.push(IntegrityIssue::BalanceMismatch {
            stored: account.balance,
            computed: running,
        });
    }

    if !account.is_within_limit() {
        issues.push(IntegrityIssue::LimitBreached {
            balance: account.balance,
            limit: account.limit,
        });
    }

    Reconciliation {
        account_id: account.id,
        balance: account.balance,
        computed_balance: running,
        transaction_count: transactions.len(),
        issues,
    }
}

/// Ledger-wide integrity report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub accounts: Vec<Reconciliation>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.accounts.iter().all(Reconciliation::is_consistent)
    }

    pub fn issue_count(&self) -> usize {
        self.accounts.iter().map(|r| r.issues.len()).sum()
    }
}
