//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{FailoverConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay environment
/// variables, and validate the result.
///
/// `vars` is the environment to read; callers pass `std::env::vars()` at
/// startup so no other component touches process state.
pub fn load_config<I>(path: Option<&Path>, vars: I) -> Result<FailoverConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => FailoverConfig::default(),
    };

    apply_env_overrides(&mut config, vars)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-style settings on top of a parsed config.
///
/// Empty values are ignored, matching how unset variables behave.
/// `BACKUP_HOST_EC2_ID` is accepted for the standby pin when
/// `BACKUP_HOST_ID` is not set.
pub fn apply_env_overrides<I>(config: &mut FailoverConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut standby_pin = None;
    let mut legacy_standby_pin = None;

    for (key, value) in vars {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "RUN_INTERVAL_MS" => config.scheduler.interval_ms = parse_env("RUN_INTERVAL_MS", &value)?,
            "CALL_TIMEOUT_MS" => config.scheduler.call_timeout_ms = parse_env("CALL_TIMEOUT_MS", &value)?,
            "LOAD_THRESHOLD" => config.health.load_threshold = parse_env("LOAD_THRESHOLD", &value)?,
            "INFLUX_HOST" => config.metrics.host = value,
            "INFLUX_DATABASE" => config.metrics.database = value,
            "HOST_TAG_KEY" => config.inventory.tag_key = value,
            "HOST_TAG_VALUE" => config.inventory.tag_value = value,
            "INVENTORY_ENDPOINT" => config.inventory.endpoint = value,
            "REGION" => config.inventory.region = value,
            "INSTANCE_API_TOKEN" => config.inventory.api_token = value,
            "LIFECYCLE_ENDPOINT" => config.lifecycle.endpoint = value,
            "BACKUP_HOST_ID" => standby_pin = Some(value),
            "BACKUP_HOST_EC2_ID" => legacy_standby_pin = Some(value),
            "POOL_API_ENDPOINT" => config.pool.endpoint = value,
            "POOL_ACCOUNT_ID" => config.pool.account_id = value,
            "POOL_ID" => config.pool.pool_id = value,
            "POOL_API_TOKEN" => config.pool.api_token = value,
            "LOG_LEVEL" => config.observability.log_level = value,
            "LOG_FORMAT" => {
                config.observability.log_format = match value.to_ascii_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::InvalidEnv { var: "LOG_FORMAT", value }),
                }
            }
            _ => {}
        }
    }

    if let Some(pin) = standby_pin.or(legacy_standby_pin) {
        config.failover.standby_instance_id = Some(pin);
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
