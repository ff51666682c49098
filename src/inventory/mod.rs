//! Instance inventory subsystem.
//!
//! # Data Flow
//! ```text
//! Each cycle:
//!     InstanceInventory::list_instances(tag selector)
//!     → Vec<InstanceRecord> (immutable snapshot)
//!     → directory.rs (primary/standby selection)
//!     → failover state machine + pool synchronizer
//! ```
//!
//! # Design Decisions
//! - Records are rebuilt every cycle from external truth; nothing is cached
//! - Role order is derived from instance ids so reordered listings agree
//! - Provider state strings outside the known set map to `Unknown`

pub mod client;
pub mod directory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::CallTimeout;

pub use client::HttpInventory;
pub use directory::{assign_roles, fallback_standby, select_backup, select_primary, RoleAssignment};

/// Externally-owned lifecycle state of a compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Stopped,
    Pending,
    Running,
    Stopping,
    #[serde(other)]
    Unknown,
}

impl LifecycleState {
    /// True while a start or stop is still in flight.
    pub fn is_transitioning(self) -> bool {
        matches!(self, LifecycleState::Pending | LifecycleState::Stopping)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Stopped => "stopped",
            LifecycleState::Pending => "pending",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance as seen in a single inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub id: String,
    pub address: Option<String>,
    pub state: LifecycleState,
}

impl InstanceRecord {
    /// Build a record, treating a blank address as no address.
    pub fn new(id: impl Into<String>, address: Option<String>, state: LifecycleState) -> Self {
        let address = address.filter(|a| !a.trim().is_empty());
        Self {
            id: id.into(),
            address,
            state,
        }
    }

    pub fn is_addressed(&self) -> bool {
        self.address.is_some()
    }
}

/// Tag selector identifying the managed instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    pub key: String,
    pub value: String,
}

/// Errors from the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Service unreachable or returned malformed data.
    #[error("inventory request failed: {0}")]
    Transport(String),

    /// Credentials rejected.
    #[error("inventory rejected credentials: {0}")]
    Unauthorized(String),

    #[error("inventory {0}")]
    Timeout(#[from] CallTimeout),
}

/// Source of instance snapshots.
#[async_trait]
pub trait InstanceInventory: Send + Sync {
    /// List every instance carrying the selector's tag.
    async fn list_instances(&self, selector: &TagSelector) -> Result<Vec<InstanceRecord>, InventoryError>;
}
