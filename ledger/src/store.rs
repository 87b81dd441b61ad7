//! Persistence seam for ledger rows.

use std::collections::HashMap;

use async_trait::async_trait;
use bank_common::{AccountId, Result};
use parking_lot::RwLock;

use crate::journal::Transaction;

/// Storage for transaction rows.
///
/// `append` must persist the whole slice or nothing, and `find_by_account`
/// must return rows in the order they were appended.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist rows atomically, in order.
    async fn append(&self, entries: &[Transaction]) -> Result<()>;

    /// All rows of one account in insertion order.
    async fn find_by_account(&self, account_id: &AccountId) -> Result<Vec<Transaction>>;
}

/// Transaction store held in memory.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    entries: RwLock<HashMap<AccountId, Vec<Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all accounts.
    pub fn len(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    /// Check if no row has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn append(&self, entries: &[Transaction]) -> Result<()> {
        let mut guard = self.entries.write();
        for entry in entries {
            guard
                .entry(entry.account_id)
                .or_default()
                .push(entry.clone());
        }
        Ok(())
    }

    async fn find_by_account(&self, account_id: &AccountId) -> Result<Vec<Transaction>> {
        Ok(self
            .entries
            .read()
            .get(account_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::TransactionKind;
    use bank_common::Currency;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_rows_are_partitioned_by_account() {
        let store = InMemoryTransactionStore::new();
        let a = AccountId::new();
        let b = AccountId::new();

        store
            .append(&[
                Transaction::new(a, Currency::Usd, dec!(1.00), TransactionKind::Deposit),
                Transaction::new(b, Currency::Usd, dec!(2.00), TransactionKind::Deposit),
                Transaction::new(a, Currency::Usd, dec!(-1.00), TransactionKind::Debit),
            ])
            .await
            .unwrap();

        let rows = store.find_by_account(&a).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, TransactionKind::Deposit);
        assert_eq!(rows[1].kind, TransactionKind::Debit);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_account_has_no_rows() {
        let store = InMemoryTransactionStore::new();
        assert!(store.find_by_account(&AccountId::new()).await.unwrap().is_empty());
        assert!(store.is_empty());
    }
}
