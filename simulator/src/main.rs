//! Bank Ledger Simulator
//!
//! Drives the account ledger engine with scripted scenarios or a random
//! concurrent workload, then checks every ledger against its balances.

use std::sync::Arc;

use bank_accounts::{AccountLedgerEngine, ChannelNotifier, EngineConfig};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod customer;
mod metrics;
mod scenario;

use controller::SimulationController;
use scenario::Scenario;

/// Bank Ledger Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Account ledger scenario and load runner")]
struct Args {
    /// Number of simulated customers to create
    #[arg(short, long, default_value = "3")]
    customers: usize,

    /// Built-in scenario name or path to a scenario JSON file
    #[arg(short, long)]
    scenario: Option<String>,

    /// Simulation speed multiplier
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Run duration in seconds (0 = until Ctrl+C)
    #[arg(long, default_value = "0")]
    duration: u64,

    /// Concurrent workers in continuous mode
    #[arg(short, long, default_value = "4")]
    workers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    let args = Args::parse();

    info!("Starting Bank Ledger Simulator");
    info!("Customers: {}", args.customers);
    info!("Speed: {}x", args.speed);

    let (notifier, mut events) = ChannelNotifier::new(config.notification_buffer);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(account = %event.account_id, kind = ?event.kind, "Account event");
        }
    });

    let engine = Arc::new(AccountLedgerEngine::in_memory_with_notifier(
        &config,
        Arc::new(notifier),
    )?);

    let mut controller =
        SimulationController::new(engine.clone(), args.customers, args.workers, args.speed, args.seed);
    controller.initialize().await?;

    if let Some(scenario_name) = &args.scenario {
        info!("Running scenario: {}", scenario_name);

        let scenario = Scenario::load(scenario_name)?;
        controller.run_scenario(scenario).await?;
    } else {
        info!("Running in continuous mode");
        info!("Press Ctrl+C to stop");

        let duration = if args.duration > 0 {
            Some(std::time::Duration::from_secs(args.duration))
        } else {
            None
        };

        controller.run(duration).await?;
    }

    let metrics = controller.metrics().await;
    let engine_metrics = engine.metrics();
    info!("Simulation complete");
    info!("Total operations: {}", metrics.total_operations);
    info!("Successful: {}", metrics.successful_operations);
    info!("Rejected: {}", metrics.rejected_operations);
    info!("Success rate: {:.1}%", metrics.success_rate() * 100.0);
    info!(
        "Latency avg/p50/p99: {}/{}/{}us",
        metrics.average_latency_us(),
        metrics.p50_latency_us(),
        metrics.p99_latency_us()
    );
    info!(
        "Engine: {} accounts, {} deposits, {} debits, {} exchanges, {} rejections",
        engine_metrics.accounts_created,
        engine_metrics.deposits,
        engine_metrics.debits,
        engine_metrics.exchanges,
        engine_metrics.rejections
    );

    Ok(())
}
