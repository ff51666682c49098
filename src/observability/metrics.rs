//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_cycles_total` (counter): cycles by outcome
//! - `failover_commands_total` (counter): dispatched commands by command, result
//! - `failover_primary_max_load` (gauge): busiest bucket mean of the last evaluation
//! - `failover_pool_sync_total` (counter): pool reconciliations by outcome
//! - `failover_pool_members` (gauge): origins in the last written pool
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;

use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cycle(outcome: &'static str) {
    counter!("failover_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_command(command: &'static str, result: &'static str) {
    counter!("failover_commands_total", "command" => command, "result" => result).increment(1);
}

pub fn record_primary_load(max_load: f64) {
    gauge!("failover_primary_max_load").set(max_load);
}

pub fn record_pool_sync(outcome: &'static str, members: Option<usize>) {
    counter!("failover_pool_sync_total", "outcome" => outcome).increment(1);
    if let Some(members) = members {
        gauge!("failover_pool_members").set(members as f64);
    }
}
