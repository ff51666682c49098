//! Evaluation window arithmetic.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::HealthConfig;

/// Trailing time range split into equal-width buckets.
///
/// Computed once per cycle from a single wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub from_ms: u64,
    pub to_ms: u64,
    pub num_splits: u32,
    pub bucket_width_ms: u64,
}

impl QueryWindow {
    /// Window `[now - lookback, now - lag]` split into `num_splits` buckets.
    pub fn ending_at(now_ms: u64, config: &HealthConfig) -> Self {
        let from_ms = now_ms.saturating_sub(config.lookback_ms);
        let to_ms = now_ms.saturating_sub(config.lag_ms);
        let num_splits = config.num_splits.max(1);
        let total = to_ms.saturating_sub(from_ms);
        let bucket_width_ms = (total as f64 / num_splits as f64).round() as u64;

        Self {
            from_ms,
            to_ms,
            num_splits,
            bucket_width_ms,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
