//! Per-account mutual exclusion.

use std::sync::Arc;

use bank_common::AccountId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard held for the whole unit of work on one account.
pub type AccountGuard = OwnedMutexGuard<()>;

/// One async mutex per account.
///
/// Operations on the same account are serialized; different accounts never
/// contend. The map entry is cloned out before awaiting, so no shard lock is
/// held across a suspension point.
#[derive(Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `account_id`.
    pub async fn acquire(&self, account_id: &AccountId) -> AccountGuard {
        let lock = self
            .locks
            .entry(*account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        lock.lock_owned().await
    }

    /// Get the number of accounts with a lock slot.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Check if no lock slot exists.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_account_is_serialized() {
        let locks = Arc::new(AccountLocks::new());
        let account = AccountId::new();

        let guard = locks.acquire(&account).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&account).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_accounts_do_not_block() {
        let locks = AccountLocks::new();
        let a = AccountId::new();
        let b = AccountId::new();

        let _first = locks.acquire(&a).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&b)).await;

        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
