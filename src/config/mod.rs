//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (RUN_INTERVAL_MS, LOAD_THRESHOLD, POOL_ID, ...)
//!     → validation.rs (semantic checks, missing identifiers)
//!     → FailoverConfig (validated, immutable)
//!     → handed by reference to each component at startup
//! ```
//!
//! # Design Decisions
//! - Config is built once; components never read the environment themselves
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::FailoverConfig;
pub use schema::{
    FailoverPolicyConfig, HealthConfig, InventoryConfig, LifecycleApiConfig, LogFormat,
    MetricsConfig, ObservabilityConfig, PoolConfig, SchedulerConfig,
};
