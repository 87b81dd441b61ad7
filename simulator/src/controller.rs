//! Simulation controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bank_accounts::AccountLedgerEngine;
use bank_common::{Currency, Result as BankResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::customer::{CustomerFactory, SimulatedCustomer};
use crate::metrics::SimulationMetrics;
use crate::scenario::{Operation, Scenario, ScenarioStep};

/// Cents every customer starts with in each currency in continuous mode.
const CONTINUOUS_FUNDING_CENTS: i64 = 1_000_000;

/// Controls the simulation.
pub struct SimulationController {
    /// Engine under test.
    engine: Arc<AccountLedgerEngine>,
    /// Number of customers.
    customer_count: usize,
    /// Concurrent workers in continuous mode.
    workers: usize,
    /// Simulation speed multiplier.
    speed: f64,
    /// Seed for reproducible runs.
    seed: Option<u64>,
    /// Simulated customers.
    customers: Arc<Vec<SimulatedCustomer>>,
    /// Simulation metrics.
    metrics: Arc<Mutex<SimulationMetrics>>,
    /// Running flag.
    running: Arc<AtomicBool>,
}

impl SimulationController {
    /// Create a new simulation controller.
    pub fn new(
        engine: Arc<AccountLedgerEngine>,
        customer_count: usize,
        workers: usize,
        speed: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            engine,
            customer_count,
            workers: workers.max(1),
            speed: if speed > 0.0 { speed } else { 1.0 },
            seed,
            customers: Arc::new(Vec::new()),
            metrics: Arc::new(Mutex::new(SimulationMetrics::new())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the customer accounts.
    pub async fn initialize(&mut self) -> anyhow::Result<()> {
        info!(customers = self.customer_count, "Opening customer accounts");

        let customers = CustomerFactory::open_customers(&self.engine, self.customer_count).await?;
        self.customers = Arc::new(customers);

        Ok(())
    }

    /// Run a scenario; any failed assertion aborts the run.
    pub async fn run_scenario(&self, scenario: Scenario) -> anyhow::Result<()> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        self.running.store(true, Ordering::SeqCst);

        for (index, step) in scenario.steps.iter().enumerate() {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.execute_step(step)
                .await
                .map_err(|err| anyhow::anyhow!("Step {} failed: {}", index + 1, err))?;
        }

        self.running.store(false, Ordering::SeqCst);
        self.verify_all().await?;

        info!(scenario = %scenario.name, "Scenario passed");
        Ok(())
    }

    /// Run random operations until `duration` elapses or Ctrl+C.
    pub async fn run(&self, duration: Option<Duration>) -> anyhow::Result<()> {
        info!(workers = self.workers, "Running simulation in continuous mode");

        if self.customers.is_empty() {
            return Err(anyhow::anyhow!("No customers to simulate"));
        }

        for customer in self.customers.iter() {
            customer
                .fund(&self.engine, Decimal::new(CONTINUOUS_FUNDING_CENTS, 2))
                .await?;
        }

        self.running.store(true, Ordering::SeqCst);

        let delay = Duration::from_millis((1000.0 / self.speed) as u64);
        let handles: Vec<_> = (0..self.workers)
            .map(|worker| {
                let engine = self.engine.clone();
                let customers = self.customers.clone();
                let metrics = self.metrics.clone();
                let running = self.running.clone();
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
                    None => StdRng::from_entropy(),
                };

                tokio::spawn(async move {
                    while running.load(Ordering::SeqCst) {
                        let customer = &customers[rng.gen_range(0..customers.len())];
                        let operation = random_operation(&mut rng);

                        let started = Instant::now();
                        let result = apply(&engine, customer, &operation).await;
                        let latency = started.elapsed();

                        match result {
                            Ok(()) => metrics.lock().await.record_success(latency),
                            Err(err) => {
                                debug!(customer = %customer.name, error = %err, "Operation rejected");
                                metrics.lock().await.record_rejection(latency);
                            }
                        }

                        tokio::time::sleep(delay).await;
                    }
                })
            })
            .collect();

        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => tokio::signal::ctrl_c().await?,
        }

        self.running.store(false, Ordering::SeqCst);
        for handle in handles {
            handle.await?;
        }

        self.verify_all().await
    }

    /// Execute a single scenario step.
    async fn execute_step(&self, step: &ScenarioStep) -> anyhow::Result<()> {
        if let Some((name, operation)) = step.operation() {
            let customer = self.customer(name)?;
            info!(customer = %name, ?operation, "Applying operation");

            let started = Instant::now();
            let result = apply(&self.engine, customer, &operation).await;
            let latency = started.elapsed();

            return match result {
                Ok(()) => {
                    self.metrics.lock().await.record_success(latency);
                    Ok(())
                }
                Err(err) => {
                    self.metrics.lock().await.record_rejection(latency);
                    Err(anyhow::anyhow!("{:?} refused: {}", operation, err))
                }
            };
        }

        match step {
            ScenarioStep::Wait { millis } => {
                let adjusted = (*millis as f64 / self.speed) as u64;
                info!("Waiting {}ms (adjusted: {}ms)", millis, adjusted);
                tokio::time::sleep(Duration::from_millis(adjusted)).await;
            }
            ScenarioStep::AssertBalance {
                customer,
                currency,
                amount,
            } => {
                let account = self.customer(customer)?;
                let actual = self.engine.get_balance(&account.account_id).await?.get(*currency);
                if actual != *amount {
                    return Err(anyhow::anyhow!(
                        "{} {} balance is {}, expected {}",
                        customer,
                        currency,
                        actual,
                        amount
                    ));
                }
            }
            ScenarioStep::AssertHistoryLen { customer, len } => {
                let account = self.customer(customer)?;
                let actual = self
                    .engine
                    .get_transaction_history(&account.account_id)
                    .await?
                    .len();
                if actual != *len {
                    return Err(anyhow::anyhow!(
                        "{} has {} transactions, expected {}",
                        customer,
                        actual,
                        len
                    ));
                }
            }
            ScenarioStep::ExpectRejection {
                customer,
                operation,
                message,
            } => {
                let account = self.customer(customer)?;

                let started = Instant::now();
                let result = apply(&self.engine, account, operation).await;
                let latency = started.elapsed();

                match result {
                    Ok(()) => {
                        self.metrics.lock().await.record_success(latency);
                        return Err(anyhow::anyhow!("{:?} was accepted", operation));
                    }
                    Err(err) => {
                        self.metrics.lock().await.record_rejection(latency);
                        if err.message() != *message {
                            return Err(anyhow::anyhow!(
                                "{:?} refused with \"{}\", expected \"{}\"",
                                operation,
                                err.message(),
                                message
                            ));
                        }
                    }
                }
            }
            ScenarioStep::Deposit { .. }
            | ScenarioStep::Debit { .. }
            | ScenarioStep::Exchange { .. } => {}
        }

        Ok(())
    }

    /// Replay every customer's ledger against their balances.
    async fn verify_all(&self) -> anyhow::Result<()> {
        let mut inconsistent = 0;
        for customer in self.customers.iter() {
            if !self.engine.verify_account(&customer.account_id).await? {
                warn!(customer = %customer.name, "Ledger mismatch");
                inconsistent += 1;
            }
        }

        if inconsistent > 0 {
            return Err(anyhow::anyhow!("{} accounts failed ledger verification", inconsistent));
        }

        info!(accounts = self.customers.len(), "All ledgers verified");
        Ok(())
    }

    fn customer(&self, name: &str) -> anyhow::Result<&SimulatedCustomer> {
        self.customers
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown customer: {}", name))
    }

    /// Get simulation metrics.
    pub async fn metrics(&self) -> SimulationMetrics {
        self.metrics.lock().await.clone()
    }
}

async fn apply(
    engine: &AccountLedgerEngine,
    customer: &SimulatedCustomer,
    operation: &Operation,
) -> BankResult<()> {
    let id = &customer.account_id;
    match *operation {
        Operation::Deposit { currency, amount } => engine.deposit(id, currency, amount).await?,
        Operation::Debit { currency, amount } => engine.debit(id, currency, amount).await?,
        Operation::Exchange { from, to, amount } => engine.exchange(id, from, to, amount).await?,
    };
    Ok(())
}

fn random_operation(rng: &mut StdRng) -> Operation {
    let pick = |rng: &mut StdRng| Currency::ALL[rng.gen_range(0..Currency::COUNT)];
    let amount = Decimal::new(rng.gen_range(1..=50_000), 2);

    match rng.gen_range(0..100) {
        0..=39 => Operation::Deposit {
            currency: pick(rng),
            amount,
        },
        40..=74 => Operation::Debit {
            currency: pick(rng),
            amount,
        },
        _ => Operation::Exchange {
            from: pick(rng),
            to: pick(rng),
            amount,
        },
    }
}
