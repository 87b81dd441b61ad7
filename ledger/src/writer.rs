//! Ledger writer: sole creator of transaction rows.

use std::sync::Arc;

use bank_common::{AccountId, Balances, Currency, Result};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::journal::{LedgerBatch, Transaction, TransactionKind};
use crate::store::TransactionStore;

/// Creates transaction rows and writes them through a [`TransactionStore`].
///
/// No business validation happens here; callers check amounts and balances
/// before asking for a row.
#[derive(Clone)]
pub struct LedgerWriter {
    store: Arc<dyn TransactionStore>,
}

impl LedgerWriter {
    /// Create a new writer over `store`.
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Build a row without persisting it.
    pub fn entry(
        &self,
        account_id: AccountId,
        currency: Currency,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Transaction {
        Transaction::new(account_id, currency, amount, kind)
    }

    /// Create and persist a single row.
    pub async fn append(
        &self,
        account_id: AccountId,
        currency: Currency,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Result<Transaction> {
        let entry = self.entry(account_id, currency, amount, kind);
        self.store.append(std::slice::from_ref(&entry)).await?;
        Ok(entry)
    }

    /// Persist every row of `batch` in one store call.
    #[instrument(skip(self, batch), fields(account = %batch.account_id, rows = batch.len()))]
    pub async fn commit(&self, batch: LedgerBatch) -> Result<Vec<Transaction>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        self.store.append(&batch.entries).await?;
        debug!("Ledger batch committed");

        Ok(batch.entries)
    }

    /// All rows of one account in insertion order.
    pub async fn history(&self, account_id: &AccountId) -> Result<Vec<Transaction>> {
        self.store.find_by_account(account_id).await
    }

    /// Per-currency sum of signed amounts for one account.
    pub async fn net_positions(&self, account_id: &AccountId) -> Result<Balances> {
        let mut positions = Balances::zero();
        for entry in self.history(account_id).await? {
            positions.credit(entry.currency, entry.amount)?;
        }
        Ok(positions)
    }
}
