//! Rate table trait and the in-memory implementation.

use async_trait::async_trait;
use bank_common::{ConversionRate, CurrencyPair};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Read access to directional conversion rates.
///
/// Absence of a pair is a normal outcome (`Ok(None)`); errors are reserved
/// for a backing store that cannot be read.
#[async_trait]
pub trait RateTable: Send + Sync {
    /// Get the multiplier for the exact ordered pair.
    async fn lookup(&self, pair: &CurrencyPair) -> FxResult<Option<Decimal>>;
}

/// Thread-safe rate table held in memory.
pub struct InMemoryRateTable {
    rates: DashMap<CurrencyPair, Decimal>,
}

impl InMemoryRateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            rates: DashMap::new(),
        }
    }

    /// Insert or replace the rate for a pair.
    pub fn insert(&self, rate: ConversionRate) -> FxResult<()> {
        if rate.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                pair: rate.pair,
                rate: rate.rate,
            });
        }

        self.rates.insert(rate.pair, rate.rate);
        Ok(())
    }

    /// Get the number of configured pairs.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if no rate is configured.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All configured rates.
    pub fn rates(&self) -> Vec<ConversionRate> {
        self.rates
            .iter()
            .map(|entry| ConversionRate {
                pair: *entry.key(),
                rate: *entry.value(),
            })
            .collect()
    }
}

impl Default for InMemoryRateTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateTable for InMemoryRateTable {
    async fn lookup(&self, pair: &CurrencyPair) -> FxResult<Option<Decimal>> {
        let rate = self.rates.get(pair).map(|r| *r);
        if rate.is_none() {
            debug!(pair = %pair, "Rate miss");
        }
        Ok(rate)
    }
}
