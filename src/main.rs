//! Standby failover controller (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!        ┌──────────────────────────────────────────────────────────────┐
//!        │                     FAILOVER CONTROLLER                      │
//!        │                                                              │
//!        │   ┌───────────┐    ┌───────────┐    ┌──────────────────┐     │
//!  tick ─┼──▶│ inventory │───▶│  health   │───▶│ failover state   │─────┼──▶ lifecycle API
//!        │   │ directory │    │ evaluator │    │ machine          │     │    (start/stop)
//!        │   └─────┬─────┘    └───────────┘    └──────────────────┘     │
//!        │         │                                                    │
//!        │         │          ┌──────────────────┐                      │
//!        │         └─────────▶│ pool synchronizer│──────────────────────┼──▶ traffic pool API
//!        │                    └──────────────────┘                      │
//!        │                                                              │
//!        │  ┌────────────────────────────────────────────────────────┐  │
//!        │  │ config │ observability │ resilience │ lifecycle         │  │
//!        │  └────────────────────────────────────────────────────────┘  │
//!        └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use standby_failover::config::load_config;
use standby_failover::lifecycle::{build_controller, wait_for_signal, Shutdown};
use standby_failover::observability::{logging, metrics};
use standby_failover::PollScheduler;

#[derive(Parser)]
#[command(name = "standby-failover")]
#[command(about = "Starts and stops a standby instance based on primary load", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Probe lifecycle commands without executing them.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref(), std::env::vars()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("standby-failover: {e}");
            std::process::exit(1);
        }
    };
    if cli.dry_run {
        config.failover.dry_run = true;
    }

    logging::init_logging(&config.observability);
    tracing::info!("standby-failover v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        tag = %format!("{}={}", config.inventory.tag_key, config.inventory.tag_value),
        pool_id = %config.pool.pool_id,
        load_threshold = config.health.load_threshold,
        interval_ms = config.scheduler.interval_ms,
        call_timeout_ms = config.scheduler.call_timeout_ms,
        dry_run = config.failover.dry_run,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let controller = build_controller(&config)?;
    let scheduler = PollScheduler::new(controller, Duration::from_millis(config.scheduler.interval_ms));

    if cli.once {
        let report = scheduler.run_once().await;
        tracing::info!(cycle_id = %report.cycle_id, outcome = report.outcome_label(), "Single cycle complete");
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let scheduler_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(scheduler.run(scheduler_shutdown));

    wait_for_signal().await;
    shutdown.trigger();
    handle.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
