//! Health verdicts.
//!
//! # States
//! - Healthy: every bucket reported and none exceeds the threshold
//! - Overloaded: the busiest bucket mean is strictly above the threshold
//! - NotReporting: fewer buckets than expected came back
//!
//! A silent primary is reported as NotReporting, never as Healthy.

use std::fmt;

/// Outcome of evaluating the primary's load window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthVerdict {
    Healthy { max_load: f64 },
    Overloaded { max_load: f64, threshold: f64 },
    NotReporting { expected_buckets: usize, received_buckets: usize },
}

impl HealthVerdict {
    /// Classify the per-bucket means of one window.
    ///
    /// More buckets than expected can come back when the window straddles a
    /// bucket boundary; the maximum is taken over all of them.
    pub fn classify(bucket_means: &[f64], expected_buckets: usize, threshold: f64) -> Self {
        if bucket_means.len() < expected_buckets || bucket_means.is_empty() {
            return HealthVerdict::NotReporting {
                expected_buckets,
                received_buckets: bucket_means.len(),
            };
        }

        let max_load = bucket_means.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max_load > threshold {
            HealthVerdict::Overloaded { max_load, threshold }
        } else {
            HealthVerdict::Healthy { max_load }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthVerdict::Healthy { .. } => "healthy",
            HealthVerdict::Overloaded { .. } => "overloaded",
            HealthVerdict::NotReporting { .. } => "not_reporting",
        }
    }

    pub fn max_load(&self) -> Option<f64> {
        match self {
            HealthVerdict::Healthy { max_load } | HealthVerdict::Overloaded { max_load, .. } => Some(*max_load),
            HealthVerdict::NotReporting { .. } => None,
        }
    }
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthVerdict::Healthy { max_load } => write!(f, "healthy (max load {max_load:.2})"),
            HealthVerdict::Overloaded { max_load, threshold } => {
                write!(f, "overloaded (max load {max_load:.2} > {threshold:.2})")
            }
            HealthVerdict::NotReporting {
                expected_buckets,
                received_buckets,
            } => write!(f, "not reporting ({received_buckets}/{expected_buckets} buckets)"),
        }
    }
}
