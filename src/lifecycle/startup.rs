//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared HTTP client with a per-request deadline
//! - Wire the HTTP collaborators into a [`Controller`]
//!
//! Config has already been validated; any failure here is fatal.

use std::sync::Arc;
use std::time::Duration;

use crate::config::FailoverConfig;
use crate::failover::HttpLifecycleApi;
use crate::health::InfluxClient;
use crate::inventory::HttpInventory;
use crate::pool::HttpPoolApi;
use crate::scheduler::Controller;

const USER_AGENT: &str = concat!("standby-failover/", env!("CARGO_PKG_VERSION"));

/// Build a controller talking to the configured HTTP endpoints.
pub fn build_controller(config: &FailoverConfig) -> Result<Controller, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_millis(config.scheduler.call_timeout_ms))
        .build()?;

    let inventory = Arc::new(HttpInventory::new(client.clone(), &config.inventory));
    let metrics_store = Arc::new(InfluxClient::new(client.clone(), &config.metrics));
    let lifecycle = Arc::new(HttpLifecycleApi::new(client.clone(), &config.lifecycle, &config.inventory));
    let pool_api = Arc::new(HttpPoolApi::new(client, &config.pool));

    Ok(Controller::from_config(config, inventory, metrics_store, lifecycle, pool_api))
}
