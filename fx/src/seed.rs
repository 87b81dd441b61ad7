//! Startup seeding of the default rate set.

use bank_common::{ConversionRate, Currency};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::FxResult;
use crate::rate_table::InMemoryRateTable;

/// Default directional rates. Pairs are not reciprocal.
pub fn default_rates() -> Vec<ConversionRate> {
    use Currency::*;

    let table: [(Currency, Currency, i64, u32); 12] = [
        (Eur, Usd, 102, 2),
        (Eur, Sek, 1150, 2),
        (Eur, Rub, 10580, 2),
        (Usd, Eur, 98, 2),
        (Usd, Sek, 1126, 2),
        (Usd, Rub, 10354, 2),
        (Sek, Eur, 87, 3),
        (Sek, Usd, 89, 3),
        (Sek, Rub, 908, 2),
        (Rub, Eur, 95, 4),
        (Rub, Usd, 97, 4),
        (Rub, Sek, 11, 2),
    ];

    table
        .into_iter()
        .map(|(from, to, mantissa, scale)| {
            ConversionRate::new(from, to, Decimal::new(mantissa, scale))
        })
        .collect()
}

/// Populate `table` with [`default_rates`] unless it already holds rates.
///
/// Returns the number of rates inserted (zero when skipped).
pub fn seed_default_rates(table: &InMemoryRateTable) -> FxResult<usize> {
    if !table.is_empty() {
        info!(existing = table.len(), "Rate table already populated, skipping seed");
        return Ok(0);
    }

    let rates = default_rates();
    let count = rates.len();
    for rate in rates {
        table.insert(rate)?;
    }

    info!(rates = count, "Seeded default conversion rates");
    Ok(count)
}
