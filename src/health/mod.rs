//! Health evaluation subsystem.
//!
//! # Data Flow
//! ```text
//! Cycle start:
//!     wall clock read once
//!     → window.rs (from/to, bucket width)
//!     → MetricsStore::bucket_means (influx.rs)
//!     → verdict.rs (Healthy / Overloaded / NotReporting)
//!     → failover state machine
//! ```
//!
//! # Design Decisions
//! - Missing buckets mean the primary is down or not instrumented
//! - The configured threshold is applied everywhere; comparison is strict `>`
//! - A query failure aborts the decision instead of guessing a verdict

pub mod influx;
pub mod verdict;
pub mod window;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::HealthConfig;
use crate::resilience::CallTimeout;

pub use influx::InfluxClient;
pub use verdict::HealthVerdict;
pub use window::QueryWindow;

/// Errors from the metrics store.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics request failed: {0}")]
    Transport(String),

    #[error("metrics query rejected: {0}")]
    Query(String),

    #[error("metrics {0}")]
    Timeout(#[from] CallTimeout),
}

/// Bucketed load query for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadQuery {
    /// Host identity as recorded by the metrics agent (the instance id).
    pub host: String,
    pub window: QueryWindow,
}

/// Time-series store returning per-bucket mean load.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Means of the load signal per bucket, oldest first. Empty buckets are
    /// omitted, never zero-filled.
    async fn bucket_means(&self, query: &LoadQuery) -> Result<Vec<f64>, MetricsError>;
}

/// Turns the primary's recent load into a [`HealthVerdict`].
#[derive(Clone)]
pub struct HealthEvaluator {
    store: Arc<dyn MetricsStore>,
    config: HealthConfig,
}

impl HealthEvaluator {
    pub fn new(store: Arc<dyn MetricsStore>, config: HealthConfig) -> Self {
        Self { store, config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.load_threshold
    }

    /// Evaluate `host` over the window ending at `now_ms`.
    pub async fn evaluate(&self, host: &str, now_ms: u64) -> Result<HealthVerdict, MetricsError> {
        let window = QueryWindow::ending_at(now_ms, &self.config);
        let query = LoadQuery {
            host: host.to_string(),
            window,
        };

        let means = self.store.bucket_means(&query).await?;
        let verdict = HealthVerdict::classify(&means, window.num_splits as usize, self.config.load_threshold);

        tracing::debug!(
            host = %host,
            buckets = means.len(),
            expected = window.num_splits,
            verdict = %verdict,
            "Primary health evaluated"
        );
        Ok(verdict)
    }
}

impl std::fmt::Debug for HealthEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthEvaluator")
            .field("config", &self.config)
            .finish()
    }
}
