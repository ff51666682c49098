//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the failover controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverConfig {
    /// Instance inventory source (tag selector, endpoint).
    pub inventory: InventoryConfig,

    /// Time-series store holding the primary's load samples.
    pub metrics: MetricsConfig,

    /// Health evaluation window and threshold.
    pub health: HealthConfig,

    /// Role selection and command dispatch behaviour.
    pub failover: FailoverPolicyConfig,

    /// Instance lifecycle API (start/stop).
    pub lifecycle: LifecycleApiConfig,

    /// Traffic pool API.
    pub pool: PoolConfig,

    /// Poll interval and per-call deadlines.
    pub scheduler: SchedulerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Inventory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Base URL of the inventory service.
    pub endpoint: String,

    /// Tag key used to select the managed instances.
    pub tag_key: String,

    /// Tag value used to select the managed instances (required).
    pub tag_value: String,

    /// Region the instances live in (required).
    pub region: String,

    /// Bearer credential shared by the inventory and lifecycle APIs (required).
    pub api_token: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8900".to_string(),
            tag_key: "failover-group".to_string(),
            tag_value: String::new(),
            region: String::new(),
            api_token: String::new(),
        }
    }
}

/// Metrics store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Host of the InfluxDB server (port optional).
    pub host: String,

    /// Database name.
    pub database: String,

    /// Retention policy the measurement is stored under.
    pub retention_policy: String,

    /// Measurement holding the load samples.
    pub measurement: String,

    /// Field averaged per bucket.
    pub field: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            database: "telegraf".to_string(),
            retention_policy: "autogen".to_string(),
            measurement: "system".to_string(),
            field: "load5".to_string(),
        }
    }
}

/// Health evaluation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Bucket means strictly above this value mark the primary as overloaded.
    pub load_threshold: f64,

    /// How far back the evaluation window starts, in milliseconds.
    pub lookback_ms: u64,

    /// How far behind wall-clock time the window ends, in milliseconds.
    pub lag_ms: u64,

    /// Number of equal-width buckets the window is split into.
    pub num_splits: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            load_threshold: 0.2,
            lookback_ms: 30 * 60 * 1000,
            lag_ms: 5 * 60 * 1000,
            num_splits: 3,
        }
    }
}

/// Failover policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverPolicyConfig {
    /// Instance to start when no role assignment can be made.
    pub standby_instance_id: Option<String>,

    /// Probe lifecycle commands without executing them.
    pub dry_run: bool,
}

/// Lifecycle API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleApiConfig {
    /// Base URL of the lifecycle API.
    pub endpoint: String,
}

impl Default for LifecycleApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8900".to_string(),
        }
    }
}

/// Traffic pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Base URL of the pool API.
    pub endpoint: String,

    /// Account owning the pool (required).
    pub account_id: String,

    /// Pool identifier (required).
    pub pool_id: String,

    /// Bearer token for the pool API (required).
    pub api_token: String,

    /// Skip the write when the pool already lists the desired origins.
    pub skip_unchanged: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cloudflare.com/client/v4".to_string(),
            account_id: String::new(),
            pool_id: String::new(),
            api_token: String::new(),
            skip_unchanged: false,
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Time between cycles in milliseconds.
    pub interval_ms: u64,

    /// Deadline for each individual collaborator call in milliseconds.
    pub call_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 300_000,
            call_timeout_ms: 30_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
