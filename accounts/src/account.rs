//! Account definitions.

use bank_common::{AccountId, BankError, Balances, Currency, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A multi-currency account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Caller-supplied account number. Not required to be unique.
    pub account_number: String,
    /// Balance per supported currency.
    pub balances: Balances,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Open a new account with every currency at zero.
    pub fn open(account_number: impl Into<String>) -> Result<Self> {
        let account_number = account_number.into();
        if account_number.trim().is_empty() {
            return Err(BankError::invalid_argument("Account number is mandatory"));
        }

        let now = Utc::now();
        Ok(Self {
            id: AccountId::new(),
            account_number,
            balances: Balances::zero(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Balance held in `currency`.
    pub fn balance(&self, currency: Currency) -> Decimal {
        self.balances.get(currency)
    }

    /// Mark the account as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_initialises_all_currencies() {
        let account = Account::open("12345").unwrap();

        assert_eq!(account.account_number, "12345");
        for currency in Currency::ALL {
            assert_eq!(account.balance(currency), Decimal::ZERO);
        }
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_open_rejects_blank_number() {
        for number in ["", "   ", "\t\n"] {
            let err = Account::open(number).unwrap_err();
            assert_eq!(err, BankError::invalid_argument("Account number is mandatory"));
        }
    }

    #[test]
    fn test_serialized_view() {
        let account = Account::open("SE-001").unwrap();
        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["account_number"], "SE-001");
        assert_eq!(json["balances"]["USD"], "0.00");
        assert_eq!(json["balances"].as_object().unwrap().len(), 4);
    }
}
