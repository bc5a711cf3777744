use chrono::{DateTime, Utc};

use super::{Account, TransactionRecord};

/// Number of entries a statement shows.
pub const STATEMENT_SIZE: usize = 10;

/// Point-in-time view of an account: balance, limit and the latest entries.
#[derive(Debug, Clone)]
pub struct Statement {
    pub account: Account,
    /// When the statement was produced (request time, not last activity)
    pub generated_at: DateTime<Utc>,
    /// Newest first, at most `STATEMENT_SIZE` entries
    pub recent: Vec<TransactionRecord>,
}

impl Statement {
    pub fn new(account: Account, mut recent: Vec<TransactionRecord>) -> Self {
        recent.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        recent.truncate(STATEMENT_SIZE);
        Self {
            account,
            generated_at: Utc::now(),
            recent,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::NewTransaction;

    #[test]
    fn test_statement_orders_newest_first_and_truncates() {
        let base = Utc::now();
        let tx = NewTransaction::new(1, "c", "x").unwrap();
        let records: Vec<_> = (0..12)
            .map(|i| {
                let mut r = TransactionRecord::new(1, &tx, i + 1);
                r.sequence = i + 1;
                r.created_at = base + Duration::seconds(i);
                r
            })
            .collect();

        let statement = Statement::new(Account::new(1, 0), records);
        assert_eq!(statement.recent.len(), STATEMENT_SIZE);
        assert_eq!(statement.recent[0].sequence, 12);
        assert_eq!(statement.recent[9].sequence, 3);
    }

    #[test]
    fn test_same_instant_breaks_ties_by_sequence() {
        let now = Utc::now();
        let tx = NewTransaction::new(1, "c", "x").unwrap();
        let mut first = TransactionRecord::new(1, &tx, 1);
        first.sequence = 1;
        first.created_at = now;
        let mut second = TransactionRecord::new(1, &tx, 2);
        second.sequence = 2;
        second.created_at = now;

        let statement = Statement::new(Account::new(1, 0), vec![first, second]);
        assert_eq!(statement.recent[0].sequence, 2);
    }
}
