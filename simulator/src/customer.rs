//! Simulated customers holding engine accounts.

use bank_accounts::AccountLedgerEngine;
use bank_common::{AccountId, Currency};
use rust_decimal::Decimal;

/// A simulated customer with one account.
#[derive(Debug, Clone)]
pub struct SimulatedCustomer {
    /// Name used by scenario steps.
    pub name: String,
    /// Engine account of the customer.
    pub account_id: AccountId,
}

impl SimulatedCustomer {
    /// Deposit `amount` into every currency.
    pub async fn fund(&self, engine: &AccountLedgerEngine, amount: Decimal) -> anyhow::Result<()> {
        for currency in Currency::ALL {
            engine.deposit(&self.account_id, currency, amount).await?;
        }
        Ok(())
    }
}

/// Customer factory for opening simulated accounts.
pub struct CustomerFactory;

impl CustomerFactory {
    const NAMES: [&'static str; 10] = [
        "ALICE", "BOB", "CAROL", "DAVE", "ERIN", "FRANK", "GRACE", "HEIDI", "IVAN", "JUDY",
    ];

    /// Open `count` accounts with zero balances.
    pub async fn open_customers(
        engine: &AccountLedgerEngine,
        count: usize,
    ) -> anyhow::Result<Vec<SimulatedCustomer>> {
        let mut customers = Vec::with_capacity(count);

        for i in 0..count {
            let name = match Self::NAMES.get(i) {
                Some(name) => name.to_string(),
                None => format!("CUSTOMER_{}", i + 1),
            };
            let account = engine.create_account(&format!("SIM-{:06}", i + 1)).await?;
            customers.push(SimulatedCustomer {
                name,
                account_id: account.id,
            });
        }

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_accounts::EngineConfig;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_open_and_fund_customers() {
        let engine = AccountLedgerEngine::in_memory(&EngineConfig::default()).unwrap();

        let customers = CustomerFactory::open_customers(&engine, 12).await.unwrap();
        assert_eq!(customers.len(), 12);
        assert_eq!(customers[0].name, "ALICE");
        assert_eq!(customers[11].name, "CUSTOMER_12");

        customers[1].fund(&engine, dec!(250.00)).await.unwrap();
        let account = engine.find_account(&customers[1].account_id).await.unwrap();
        assert_eq!(account.account_number, "SIM-000002");
        for currency in Currency::ALL {
            assert_eq!(account.balance(currency), dec!(250.00));
        }
    }
}
