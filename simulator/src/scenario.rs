//! Simulation scenarios.

use std::path::Path;

use bank_common::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A single engine call issued on behalf of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Deposit funds.
    Deposit { currency: Currency, amount: Decimal },
    /// Debit funds.
    Debit { currency: Currency, amount: Decimal },
    /// Exchange between two currencies.
    Exchange {
        from: Currency,
        to: Currency,
        amount: Decimal,
    },
}

/// A step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Deposit into a customer's account.
    Deposit {
        customer: String,
        currency: Currency,
        amount: Decimal,
    },
    /// Debit a customer's account.
    Debit {
        customer: String,
        currency: Currency,
        amount: Decimal,
    },
    /// Exchange inside a customer's account.
    Exchange {
        customer: String,
        from: Currency,
        to: Currency,
        amount: Decimal,
    },
    /// Pause, scaled by the simulation speed.
    Wait { millis: u64 },
    /// Fail the run unless the balance matches.
    AssertBalance {
        customer: String,
        currency: Currency,
        amount: Decimal,
    },
    /// Fail the run unless the history has this many rows.
    AssertHistoryLen { customer: String, len: usize },
    /// Fail the run unless the operation is refused with `message`.
    ExpectRejection {
        customer: String,
        operation: Operation,
        message: String,
    },
}

impl ScenarioStep {
    /// The customer and operation of a plain mutation step.
    pub fn operation(&self) -> Option<(&str, Operation)> {
        match self {
            ScenarioStep::Deposit {
                customer,
                currency,
                amount,
            } => Some((
                customer,
                Operation::Deposit {
                    currency: *currency,
                    amount: *amount,
                },
            )),
            ScenarioStep::Debit {
                customer,
                currency,
                amount,
            } => Some((
                customer,
                Operation::Debit {
                    currency: *currency,
                    amount: *amount,
                },
            )),
            ScenarioStep::Exchange {
                customer,
                from,
                to,
                amount,
            } => Some((
                customer,
                Operation::Exchange {
                    from: *from,
                    to: *to,
                    amount: *amount,
                },
            )),
            _ => None,
        }
    }
}

impl Scenario {
    /// Names of the built-in scenarios.
    pub const BUILT_IN: [&'static str; 4] = [
        "basic-deposits",
        "overdraft",
        "currency-exchange",
        "missing-rate",
    ];

    /// Load a built-in scenario by name, or a JSON file by path.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "basic-deposits" => Ok(Self::basic_deposits()),
            "overdraft" => Ok(Self::overdraft()),
            "currency-exchange" => Ok(Self::currency_exchange()),
            "missing-rate" => Ok(Self::missing_rate()),
            path if path.ends_with(".json") => Self::from_file(path),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Read a scenario from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Parse a scenario from JSON text.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Two deposits accumulate in one currency.
    fn basic_deposits() -> Self {
        Self {
            name: "basic-deposits".to_string(),
            description: "Repeated deposits accumulate and are journaled".to_string(),
            steps: vec![
                deposit("ALICE", Currency::Usd, Decimal::new(50000, 2)),
                deposit("ALICE", Currency::Usd, Decimal::new(50000, 2)),
                ScenarioStep::AssertBalance {
                    customer: "ALICE".to_string(),
                    currency: Currency::Usd,
                    amount: Decimal::new(100000, 2),
                },
                ScenarioStep::AssertBalance {
                    customer: "ALICE".to_string(),
                    currency: Currency::Eur,
                    amount: Decimal::ZERO,
                },
                ScenarioStep::AssertHistoryLen {
                    customer: "ALICE".to_string(),
                    len: 2,
                },
            ],
        }
    }

    /// Refused debits and negative amounts leave no trace.
    fn overdraft() -> Self {
        Self {
            name: "overdraft".to_string(),
            description: "Debits beyond the balance are refused".to_string(),
            steps: vec![
                deposit("ALICE", Currency::Usd, Decimal::new(100000, 2)),
                ScenarioStep::ExpectRejection {
                    customer: "ALICE".to_string(),
                    operation: Operation::Debit {
                        currency: Currency::Usd,
                        amount: Decimal::new(200000, 2),
                    },
                    message: "Insufficient funds".to_string(),
                },
                ScenarioStep::ExpectRejection {
                    customer: "ALICE".to_string(),
                    operation: Operation::Deposit {
                        currency: Currency::Usd,
                        amount: Decimal::new(-500, 2),
                    },
                    message: "Amount must be positive".to_string(),
                },
                ScenarioStep::Wait { millis: 100 },
                ScenarioStep::AssertBalance {
                    customer: "ALICE".to_string(),
                    currency: Currency::Usd,
                    amount: Decimal::new(100000, 2),
                },
                ScenarioStep::AssertHistoryLen {
                    customer: "ALICE".to_string(),
                    len: 1,
                },
            ],
        }
    }

    /// USD to EUR at the seeded rate.
    fn currency_exchange() -> Self {
        Self {
            name: "currency-exchange".to_string(),
            description: "Exchange between two funded currencies".to_string(),
            steps: vec![
                deposit("ALICE", Currency::Usd, Decimal::new(100000, 2)),
                deposit("ALICE", Currency::Eur, Decimal::new(100000, 2)),
                ScenarioStep::Exchange {
                    customer: "ALICE".to_string(),
                    from: Currency::Usd,
                    to: Currency::Eur,
                    amount: Decimal::new(10000, 2),
                },
                ScenarioStep::AssertBalance {
                    customer: "ALICE".to_string(),
                    currency: Currency::Usd,
                    amount: Decimal::new(90000, 2),
                },
                ScenarioStep::AssertBalance {
                    customer: "ALICE".to_string(),
                    currency: Currency::Eur,
                    amount: Decimal::new(109800, 2),
                },
                ScenarioStep::AssertHistoryLen {
                    customer: "ALICE".to_string(),
                    len: 4,
                },
            ],
        }
    }

    /// A pair without a rate is refused.
    fn missing_rate() -> Self {
        Self {
            name: "missing-rate".to_string(),
            description: "Exchange over a pair with no rate is refused".to_string(),
            steps: vec![
                deposit("BOB", Currency::Sek, Decimal::new(10000, 2)),
                ScenarioStep::ExpectRejection {
                    customer: "BOB".to_string(),
                    operation: Operation::Exchange {
                        from: Currency::Sek,
                        to: Currency::Sek,
                        amount: Decimal::new(1000, 2),
                    },
                    message: "Conversion rate not found".to_string(),
                },
                ScenarioStep::AssertBalance {
                    customer: "BOB".to_string(),
                    currency: Currency::Sek,
                    amount: Decimal::new(10000, 2),
                },
                ScenarioStep::AssertHistoryLen {
                    customer: "BOB".to_string(),
                    len: 1,
                },
            ],
        }
    }
}

fn deposit(customer: &str, currency: Currency, amount: Decimal) -> ScenarioStep {
    ScenarioStep::Deposit {
        customer: customer.to_string(),
        currency,
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_built_in_scenarios_load() {
        for name in Scenario::BUILT_IN {
            let scenario = Scenario::load(name).unwrap();
            assert_eq!(scenario.name, name);
            assert!(!scenario.steps.is_empty());
        }
        assert!(Scenario::load("unknown").is_err());
    }

    #[test]
    fn test_scenario_from_json() {
        let raw = r#"{
            "name": "custom",
            "description": "Custom run",
            "steps": [
                { "step": "deposit", "customer": "ALICE", "currency": "RUB", "amount": "12.50" },
                { "step": "wait", "millis": 10 },
                {
                    "step": "expect_rejection",
                    "customer": "ALICE",
                    "operation": { "type": "debit", "currency": "RUB", "amount": "100.00" },
                    "message": "Insufficient funds"
                },
                { "step": "assert_history_len", "customer": "ALICE", "len": 1 }
            ]
        }"#;

        let scenario = Scenario::from_json(raw).unwrap();
        assert_eq!(scenario.steps.len(), 4);

        let (customer, operation) = scenario.steps[0].operation().unwrap();
        assert_eq!(customer, "ALICE");
        assert_eq!(
            operation,
            Operation::Deposit {
                currency: Currency::Rub,
                amount: dec!(12.50),
            }
        );
        assert!(scenario.steps[1].operation().is_none());
    }

    #[test]
    fn test_bad_currency_in_json_is_rejected() {
        let raw = r#"{
            "name": "bad",
            "description": "",
            "steps": [{ "step": "deposit", "customer": "A", "currency": "GBP", "amount": "1" }]
        }"#;

        assert!(Scenario::from_json(raw).is_err());
    }
}
