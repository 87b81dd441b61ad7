//! Operation counters for the engine.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Engine metrics.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Accounts opened.
    pub accounts_created: AtomicU64,
    /// Successful deposits.
    pub deposits: AtomicU64,
    /// Successful debits.
    pub debits: AtomicU64,
    /// Successful exchanges.
    pub exchanges: AtomicU64,
    /// Operations refused with an error.
    pub rejections: AtomicU64,
    /// Units of work undone after a ledger commit failure.
    pub rollbacks: AtomicU64,
}

impl EngineMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an opened account.
    pub fn account_created(&self) {
        self.accounts_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a deposit.
    pub fn deposit_applied(&self) {
        self.deposits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a debit.
    pub fn debit_applied(&self) {
        self.debits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an exchange.
    pub fn exchange_applied(&self) {
        self.exchanges.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected operation.
    pub fn operation_rejected(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rolled back unit of work.
    pub fn rolled_back(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            accounts_created: self.accounts_created.load(Ordering::Relaxed),
            deposits: self.deposits.load(Ordering::Relaxed),
            debits: self.debits.load(Ordering::Relaxed),
            exchanges: self.exchanges.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetricsSnapshot {
    pub accounts_created: u64,
    pub deposits: u64,
    pub debits: u64,
    pub exchanges: u64,
    pub rejections: u64,
    pub rollbacks: u64,
}

impl EngineMetricsSnapshot {
    /// Successful mutations of existing accounts.
    pub fn mutations(&self) -> u64 {
        self.deposits + self.debits + self.exchanges
    }
}
