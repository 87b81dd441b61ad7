//! Bank Ledger FX
//!
//! Currency conversion for multi-currency accounts.
//!
//! # Features
//!
//! - Directional rate table keyed by ordered currency pair
//! - Idempotent seeding of the default rate set
//! - Converter that moves funds between two balances of one account
//!
//! # Example
//!
//! ```rust,ignore
//! use bank_fx::{seed_default_rates, CurrencyConverter, InMemoryRateTable};
//! use bank_common::{Balances, Currency};
//!
//! let rates = Arc::new(InMemoryRateTable::new());
//! seed_default_rates(&rates)?;
//!
//! let converter = CurrencyConverter::new(rates);
//! let conversion = converter
//!     .convert(&mut balances, Currency::Usd, Currency::Eur, dec!(100.00))
//!     .await?;
//! ```

pub mod rate_table;
pub mod seed;
pub mod conversion;
pub mod converter;
pub mod error;

pub use rate_table::{InMemoryRateTable, RateTable};
pub use seed::{default_rates, seed_default_rates};
pub use conversion::Conversion;
pub use converter::CurrencyConverter;
pub use error::{FxError, FxResult};
