//! Monetary types: the closed currency set, fixed-key balances and rates.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::BankError;

/// Fraction digits carried by every settled amount.
pub const MONEY_SCALE: u32 = 2;

/// Round to [`MONEY_SCALE`] fraction digits, half-way cases away from zero.
///
/// The result always carries exactly two fraction digits, so `500` becomes
/// `500.00` and `10.005` becomes `10.01`.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// A zero amount at money scale (`0.00`).
pub fn zero_money() -> Decimal {
    Decimal::new(0, MONEY_SCALE)
}

/// Currencies an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Sek,
    Rub,
}

impl Currency {
    /// Every supported currency, in balance-slot order.
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Sek, Currency::Rub];

    /// Number of supported currencies.
    pub const COUNT: usize = Self::ALL.len();

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Sek => "SEK",
            Currency::Rub => "RUB",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| BankError::invalid_argument(format!("Invalid currency: {}", s)))
    }
}

/// Per-currency balances of one account.
///
/// Every supported currency has a slot from construction onward, so a
/// missing entry cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balances([Decimal; Currency::COUNT]);

impl Balances {
    /// All currencies at `0.00`.
    pub fn zero() -> Self {
        Self([zero_money(); Currency::COUNT])
    }

    /// Balance held in `currency`.
    pub fn get(&self, currency: Currency) -> Decimal {
        self.0[currency.slot()]
    }

    /// Overwrite the balance held in `currency`.
    pub fn set(&mut self, currency: Currency, amount: Decimal) {
        self.0[currency.slot()] = amount;
    }

    /// Check if `amount` can be taken from `currency`.
    pub fn has_sufficient_funds(&self, currency: Currency, amount: Decimal) -> bool {
        self.get(currency) >= amount
    }

    /// Add `amount` to `currency`.
    pub fn credit(&mut self, currency: Currency, amount: Decimal) -> Result<(), BankError> {
        let slot = &mut self.0[currency.slot()];
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| BankError::invalid_argument("Amount out of range"))?;
        Ok(())
    }

    /// Subtract `amount` from `currency`, refusing to go below zero.
    pub fn debit(&mut self, currency: Currency, amount: Decimal) -> Result<(), BankError> {
        if !self.has_sufficient_funds(currency, amount) {
            return Err(BankError::insufficient_funds());
        }
        self.0[currency.slot()] -= amount;
        Ok(())
    }

    /// Iterate `(currency, balance)` in [`Currency::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        Currency::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// True when no balance is negative.
    pub fn is_non_negative(&self) -> bool {
        self.0.iter().all(|b| !b.is_sign_negative() || b.is_zero())
    }

    /// Copy into an ordered map keyed by currency.
    pub fn to_map(&self) -> BTreeMap<Currency, Decimal> {
        self.iter().collect()
    }
}

impl Default for Balances {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for Balances {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Currency::COUNT))?;
        for (currency, balance) in self.iter() {
            map.serialize_entry(&currency, &balance)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Balances {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<Currency, Decimal>::deserialize(deserializer)?;
        let mut balances = Balances::zero();
        for (currency, balance) in entries {
            balances.set(currency, balance);
        }
        Ok(balances)
    }
}

/// An ordered currency pair. `USD/EUR` and `EUR/USD` are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being sold.
    pub from: Currency,
    /// Currency being bought.
    pub to: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: Currency, to: Currency) -> Self {
        Self { from, to }
    }

    /// Get the reversed pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// Directional conversion factor for one currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRate {
    /// The ordered pair this rate applies to.
    pub pair: CurrencyPair,
    /// Multiplier applied to an amount in `pair.from`.
    pub rate: Decimal,
}

impl ConversionRate {
    /// Create a new conversion rate.
    pub fn new(from: Currency, to: Currency, rate: Decimal) -> Self {
        Self {
            pair: CurrencyPair::new(from, to),
            rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_money(dec!(500)).to_string(), "500.00");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" SEK ".parse::<Currency>().unwrap(), Currency::Sek);

        let err = "GBP".parse::<Currency>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: Invalid currency: GBP");
    }

    #[test]
    fn test_new_balances_are_zero_for_every_currency() {
        let balances = Balances::zero();
        for currency in Currency::ALL {
            assert_eq!(balances.get(currency).to_string(), "0.00");
        }
    }

    #[test]
    fn test_balance_debit_refuses_overdraft() {
        let mut balances = Balances::zero();
        balances.credit(Currency::Eur, dec!(50.00)).unwrap();

        assert!(balances.debit(Currency::Eur, dec!(50.01)).is_err());
        assert_eq!(balances.get(Currency::Eur), dec!(50.00));

        balances.debit(Currency::Eur, dec!(50.00)).unwrap();
        assert_eq!(balances.get(Currency::Eur), Decimal::ZERO);
        assert!(balances.is_non_negative());
    }

    #[test]
    fn test_balance_credit_overflow_is_rejected() {
        let mut balances = Balances::zero();
        balances.set(Currency::Usd, Decimal::MAX);

        assert!(balances.credit(Currency::Usd, dec!(1)).is_err());
        assert_eq!(balances.get(Currency::Usd), Decimal::MAX);
    }

    #[test]
    fn test_balances_serialize_as_code_map() {
        let mut balances = Balances::zero();
        balances.credit(Currency::Rub, dec!(12.50)).unwrap();

        let json = serde_json::to_value(&balances).unwrap();
        assert_eq!(json["RUB"], "12.50");
        assert_eq!(json["USD"], "0.00");

        let partial: Balances = serde_json::from_str(r#"{"EUR":"3.10"}"#).unwrap();
        assert_eq!(partial.get(Currency::Eur), dec!(3.10));
        assert_eq!(partial.get(Currency::Usd), Decimal::ZERO);
    }

    #[test]
    fn test_pair_is_directional() {
        let pair = CurrencyPair::new(Currency::Usd, Currency::Eur);
        assert_ne!(pair, pair.inverse());
        assert_eq!(pair.to_string(), "USD/EUR");
    }
}
