use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::AccountId;

/// One async mutex per provisioned account.
///
/// Built once from the accounts in the store and never modified, so writers to
/// different accounts never wait on each other here. Waiters queue in FIFO order
/// without holding a pooled connection.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: HashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new(ids: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            locks: ids
                .into_iter()
                .map(|id| (id, Arc::new(Mutex::new(()))))
                .collect(),
        }
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.locks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Wait for exclusive access to an account. `None` if the id was not provisioned.
    /// The lock is released when the guard drops.
    pub async fn acquire(&self, id: AccountId) -> Option<OwnedMutexGuard<()>> {
        let lock = self.locks.get(&id)?.clone();
        Some(lock.lock_owned().await)
    }
}
