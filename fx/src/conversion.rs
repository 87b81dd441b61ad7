//! Record of a completed currency conversion.

use bank_common::CurrencyPair;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of one conversion inside an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Pair converted.
    pub pair: CurrencyPair,
    /// Rate applied.
    pub rate: Decimal,
    /// Amount taken from `pair.from`, exactly as requested (not rounded).
    pub debited: Decimal,
    /// Amount added to `pair.to`, rounded to money scale.
    pub credited: Decimal,
    /// When the conversion was executed.
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Create a new conversion record.
    pub fn new(pair: CurrencyPair, rate: Decimal, debited: Decimal, credited: Decimal) -> Self {
        Self {
            pair,
            rate,
            debited,
            credited,
            executed_at: Utc::now(),
        }
    }
}
