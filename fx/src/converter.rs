//! Currency converter operating on one account's balances.

use std::sync::Arc;

use bank_common::{round_money, Balances, Currency, CurrencyPair};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::conversion::Conversion;
use crate::error::{FxError, FxResult};
use crate::rate_table::RateTable;

/// Moves value between two currency balances of the same account.
pub struct CurrencyConverter {
    rates: Arc<dyn RateTable>,
}

impl CurrencyConverter {
    /// Create a new converter over the given rate table.
    pub fn new(rates: Arc<dyn RateTable>) -> Self {
        Self { rates }
    }

    /// Convert `amount` of `from` into `to` inside `balances`.
    ///
    /// The source balance is checked against the unrounded amount before the
    /// rate is resolved. On success `from` drops by exactly `amount` and `to`
    /// grows by `round(amount * rate, 2)`. On failure `balances` is untouched.
    #[instrument(skip(self, balances), fields(pair = %CurrencyPair::new(from, to), amount = %amount))]
    pub async fn convert(
        &self,
        balances: &mut Balances,
        from: Currency,
        to: Currency,
        amount: Decimal,
    ) -> FxResult<Conversion> {
        let available = balances.get(from);
        if available < amount {
            return Err(FxError::InsufficientFunds {
                currency: from,
                required: amount,
                available,
            });
        }

        let pair = CurrencyPair::new(from, to);
        let rate = self
            .rates
            .lookup(&pair)
            .await?
            .ok_or(FxError::RateNotFound(pair))?;

        let converted = amount
            .checked_mul(rate)
            .map(round_money)
            .ok_or(FxError::AmountOutOfRange(pair))?;

        // Apply both legs to a copy so a failed credit leaves nothing behind.
        let mut updated = balances.clone();
        updated.set(from, available - amount);
        updated.credit(to, converted)?;
        *balances = updated;

        debug!(rate = %rate, credited = %converted, "Conversion applied");

        Ok(Conversion::new(pair, rate, amount, converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_table::InMemoryRateTable;
    use crate::seed::seed_default_rates;
    use bank_common::ConversionRate;
    use rust_decimal_macros::dec;

    fn setup_converter() -> CurrencyConverter {
        let table = Arc::new(InMemoryRateTable::new());
        seed_default_rates(&table).unwrap();
        CurrencyConverter::new(table)
    }

    fn funded(usd: Decimal, eur: Decimal) -> Balances {
        let mut balances = Balances::zero();
        balances.set(Currency::Usd, usd);
        balances.set(Currency::Eur, eur);
        balances
    }

    #[tokio::test]
    async fn test_convert_usd_to_eur() {
        let converter = setup_converter();
        let mut balances = funded(dec!(1000.00), dec!(1000.00));

        let conversion = converter
            .convert(&mut balances, Currency::Usd, Currency::Eur, dec!(100.00))
            .await
            .unwrap();

        assert_eq!(conversion.credited, dec!(98.00));
        assert_eq!(conversion.rate, dec!(0.98));
        assert_eq!(balances.get(Currency::Usd), dec!(900.00));
        assert_eq!(balances.get(Currency::Eur), dec!(1098.00));
    }

    #[tokio::test]
    async fn test_credit_is_rounded_half_up_and_debit_is_exact() {
        let converter = setup_converter();
        let mut balances = funded(dec!(10.00), Decimal::ZERO);

        // 0.125 * 0.98 = 0.1225 -> 0.12; debit keeps all three digits.
        let conversion = converter
            .convert(&mut balances, Currency::Usd, Currency::Eur, dec!(0.125))
            .await
            .unwrap();

        assert_eq!(conversion.credited, dec!(0.12));
        assert_eq!(conversion.debited, dec!(0.125));
        assert_eq!(balances.get(Currency::Usd), dec!(9.875));
        assert_eq!(balances.get(Currency::Eur), dec!(0.12));
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_balances() {
        let converter = setup_converter();
        let mut balances = funded(dec!(50.00), dec!(0.00));
        let before = balances.clone();

        let result = converter
            .convert(&mut balances, Currency::Usd, Currency::Eur, dec!(50.001))
            .await;

        assert!(matches!(result, Err(FxError::InsufficientFunds { .. })));
        assert_eq!(balances, before);
    }

    #[tokio::test]
    async fn test_missing_rate_has_no_inverse_fallback() {
        let table = Arc::new(InMemoryRateTable::new());
        table
            .insert(ConversionRate::new(Currency::Eur, Currency::Usd, dec!(1.02)))
            .unwrap();
        let converter = CurrencyConverter::new(table);
        let mut balances = funded(dec!(100.00), dec!(0.00));
        let before = balances.clone();

        let result = converter
            .convert(&mut balances, Currency::Usd, Currency::Eur, dec!(10.00))
            .await;

        assert!(matches!(result, Err(FxError::RateNotFound(_))));
        assert_eq!(balances, before);
    }

    #[tokio::test]
    async fn test_funds_are_checked_before_rate() {
        let converter = CurrencyConverter::new(Arc::new(InMemoryRateTable::new()));
        let mut balances = Balances::zero();

        let result = converter
            .convert(&mut balances, Currency::Sek, Currency::Rub, dec!(1.00))
            .await;

        assert!(matches!(result, Err(FxError::InsufficientFunds { .. })));
    }
}
