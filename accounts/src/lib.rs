//! Bank Accounts
//!
//! Multi-currency accounts with an append-only transaction ledger.
//!
//! The [`AccountLedgerEngine`] is the single entry point: it opens accounts,
//! applies deposits, debits and currency exchanges, and answers balance and
//! history queries. Every mutation of an account is serialized and atomic
//! with respect to its ledger rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use bank_accounts::{AccountLedgerEngine, EngineConfig};
//! use bank_common::Currency;
//!
//! let engine = AccountLedgerEngine::in_memory(&EngineConfig::default())?;
//! let account = engine.create_account("12345").await?;
//!
//! engine.deposit(&account.id, Currency::Usd, dec!(1000.00)).await?;
//! engine.exchange(&account.id, Currency::Usd, Currency::Eur, dec!(100.00)).await?;
//! ```

pub mod account;
pub mod config;
pub mod engine;
pub mod locks;
pub mod metrics;
pub mod notify;
pub mod store;

pub use account::Account;
pub use config::EngineConfig;
pub use engine::AccountLedgerEngine;
pub use locks::AccountLocks;
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
pub use notify::{AccountEvent, AccountEventKind, ChannelNotifier, NoopNotifier, Notifier};
pub use store::{AccountStore, InMemoryAccountStore};
