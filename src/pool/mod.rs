//! Traffic pool subsystem.
//!
//! # Data Flow
//! ```text
//! Inventory snapshot
//!     → sync.rs (desired members: every addressed instance, enabled)
//!     → PoolApi::get_pool (keep name, description, monitor, notifications)
//!     → replace origin list
//!     → PoolApi::put_pool (client.rs)
//! ```
//!
//! # Design Decisions
//! - Membership is a pure function of the latest snapshot
//! - Pool metadata is read back and preserved on every write, including
//!   fields this crate does not model
//! - Per-origin settings (weights, headers) follow the origin by name
//! - Full replacement by default; diffing is opt-in (`pool.skip_unchanged`)

pub mod client;
pub mod sync;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::resilience::CallTimeout;

pub use client::HttpPoolApi;
pub use sync::{desired_members, PoolSyncOutcome, PoolSynchronizer};

/// One origin in the routing pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMember {
    pub name: String,
    pub address: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Origin settings written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PoolMember {
    /// An enabled origin with no extra settings.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            enabled: true,
            extra: Map::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Pool definition as read from and written to the pool API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_origins: Option<u32>,

    /// Health monitor attached to the pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,

    #[serde(default)]
    pub origins: Vec<PoolMember>,

    /// Pool settings written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors from pool synchronization.
#[derive(Debug, Error)]
pub enum PoolSyncError {
    #[error("failed to read pool {pool_id}: {reason}")]
    Read { pool_id: String, reason: String },

    #[error("failed to write pool {pool_id}: {reason}")]
    Write { pool_id: String, reason: String },

    #[error("pool {0}")]
    Timeout(#[from] CallTimeout),
}

/// Traffic pool API.
#[async_trait]
pub trait PoolApi: Send + Sync {
    async fn get_pool(&self, pool_id: &str) -> Result<PoolDefinition, PoolSyncError>;

    async fn put_pool(&self, pool_id: &str, pool: &PoolDefinition) -> Result<(), PoolSyncError>;
}
