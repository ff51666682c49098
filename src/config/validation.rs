//! Configuration validation.
//!
//! # Responsibilities
//! - Reject a config that lacks a required identifier (tag value, pool id,
//!   account id, credentials)
//! - Validate value ranges (threshold finite, splits > 0, deadlines below
//!   the poll interval)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::FailoverConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("`health.load_threshold` must be a finite non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("`health.num_splits` must be at least 1")]
    NoSplits,

    #[error("`health.lookback_ms` ({lookback_ms}) must be greater than `health.lag_ms` ({lag_ms})")]
    EmptyWindow { lookback_ms: u64, lag_ms: u64 },

    #[error("`scheduler.interval_ms` must be greater than zero")]
    ZeroInterval,

    #[error("`scheduler.call_timeout_ms` ({timeout_ms}) must be greater than zero and below `scheduler.interval_ms` ({interval_ms})")]
    TimeoutNotBelowInterval { timeout_ms: u64, interval_ms: u64 },

    #[error("`{field}` is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("inventory.tag_value", &config.inventory.tag_value),
        ("inventory.region", &config.inventory.region),
        ("inventory.api_token", &config.inventory.api_token),
        ("pool.account_id", &config.pool.account_id),
        ("pool.pool_id", &config.pool.pool_id),
        ("pool.api_token", &config.pool.api_token),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Missing(name));
        }
    }

    let threshold = config.health.load_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        errors.push(ValidationError::InvalidThreshold(threshold));
    }

    if config.health.num_splits == 0 {
        errors.push(ValidationError::NoSplits);
    }

    if config.health.lookback_ms <= config.health.lag_ms {
        errors.push(ValidationError::EmptyWindow {
            lookback_ms: config.health.lookback_ms,
            lag_ms: config.health.lag_ms,
        });
    }

    let scheduler = &config.scheduler;
    if scheduler.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    } else if scheduler.call_timeout_ms == 0 || scheduler.call_timeout_ms >= scheduler.interval_ms {
        errors.push(ValidationError::TimeoutNotBelowInterval {
            timeout_ms: scheduler.call_timeout_ms,
            interval_ms: scheduler.interval_ms,
        });
    }

    let urls = [
        ("inventory.endpoint", &config.inventory.endpoint),
        ("lifecycle.endpoint", &config.lifecycle.endpoint),
        ("pool.endpoint", &config.pool.endpoint),
    ];
    for (field, value) in urls {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
