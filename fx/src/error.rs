//! FX error types.

use bank_common::{BankError, Currency, CurrencyPair};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while converting between currencies.
#[derive(Debug, Error)]
pub enum FxError {
    /// No rate is configured for the ordered pair.
    #[error("Conversion rate not found for {0}")]
    RateNotFound(CurrencyPair),

    /// The source balance does not cover the amount.
    #[error("Insufficient funds: required {required} {currency}, available {available}")]
    InsufficientFunds {
        currency: Currency,
        required: Decimal,
        available: Decimal,
    },

    /// Rates must be strictly positive.
    #[error("Invalid rate {rate} for {pair}")]
    InvalidRate { pair: CurrencyPair, rate: Decimal },

    /// The converted amount does not fit in a decimal.
    #[error("Amount out of range converting {0}")]
    AmountOutOfRange(CurrencyPair),

    /// The backing rate store could not be read.
    #[error("Rate table unavailable: {0}")]
    Unavailable(String),

    /// Balance arithmetic rejected the update.
    #[error(transparent)]
    Balance(#[from] BankError),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

impl From<FxError> for BankError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::RateNotFound(_) => BankError::invalid_argument("Conversion rate not found"),
            FxError::InsufficientFunds { .. } => BankError::insufficient_funds(),
            FxError::InvalidRate { .. } => BankError::invalid_argument(err.to_string()),
            FxError::AmountOutOfRange(_) => BankError::invalid_argument("Amount out of range"),
            FxError::Unavailable(message) => BankError::Storage(message),
            FxError::Balance(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_maps_to_invalid_argument_messages() {
        let pair = CurrencyPair::new(Currency::Usd, Currency::Eur);

        let missing: BankError = FxError::RateNotFound(pair).into();
        assert_eq!(missing, BankError::invalid_argument("Conversion rate not found"));

        let short: BankError = FxError::InsufficientFunds {
            currency: Currency::Usd,
            required: dec!(10),
            available: dec!(5),
        }
        .into();
        assert_eq!(short, BankError::insufficient_funds());
    }

    #[test]
    fn test_unavailable_maps_to_storage() {
        let err: BankError = FxError::Unavailable("connection reset".into()).into();
        assert!(err.is_retryable());
    }
}
