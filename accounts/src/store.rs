//! Persistence seam for accounts.

use async_trait::async_trait;
use bank_common::{AccountId, Result};
use dashmap::DashMap;

use crate::account::Account;

/// Storage for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert or replace an account.
    async fn save(&self, account: &Account) -> Result<()>;

    /// Look an account up by id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>>;
}

/// Account store held in memory.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<AccountId, Account>,
}

impl InMemoryAccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if no account is stored.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn save(&self, account: &Account) -> Result<()> {
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_common::Currency;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryAccountStore::new();
        let mut account = Account::open("12345").unwrap();

        store.save(&account).await.unwrap();
        account.balances.credit(Currency::Usd, dec!(10.00)).unwrap();
        store.save(&account).await.unwrap();

        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(found.balance(Currency::Usd), dec!(10.00));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = InMemoryAccountStore::new();
        assert!(store.find_by_id(&AccountId::new()).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
