//! Transaction records and the batches they are committed in.

use bank_common::{AccountId, Currency, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What produced a transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Funds added to one currency.
    Deposit,
    /// Funds removed from one currency.
    Debit,
    /// One leg of a currency exchange.
    Exchange,
}

/// A single immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// Account the row belongs to.
    pub account_id: AccountId,
    /// Currency moved.
    pub currency: Currency,
    /// Signed amount: positive inbound, negative outbound.
    pub amount: Decimal,
    /// Kind tag.
    pub kind: TransactionKind,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new row stamped with a fresh id and the current time.
    pub fn new(
        account_id: AccountId,
        currency: Currency,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            currency,
            amount,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Rows of one logical operation that must be committed together.
#[derive(Debug, Clone)]
pub struct LedgerBatch {
    /// Account every row belongs to.
    pub account_id: AccountId,
    /// Rows in commit order.
    pub entries: Vec<Transaction>,
}

impl LedgerBatch {
    /// Create an empty batch for `account_id`.
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            entries: Vec::new(),
        }
    }

    /// Add a row to the batch.
    pub fn add_entry(&mut self, entry: Transaction) {
        debug_assert_eq!(entry.account_id, self.account_id);
        self.entries.push(entry);
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the batch holds no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
