//! Bank Ledger Transaction Log
//!
//! Append-only record of every balance movement. One row per deposit or
//! debit, two rows per exchange, committed as a single batch.

pub mod journal;
pub mod store;
pub mod writer;

pub use journal::{LedgerBatch, Transaction, TransactionKind};
pub use store::{InMemoryTransactionStore, TransactionStore};
pub use writer::LedgerWriter;
