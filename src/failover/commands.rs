//! Lifecycle command dispatch.
//!
//! # Protocol
//! ```text
//! probe(action, id)    dry validation  → PermissionDenied on missing rights
//! execute(action, id)  real call       → Rejected if the instance is not
//!                                        in the expected starting state
//! ```
//!
//! Each step runs under the per-call deadline. A rejected or denied call is
//! reported to the caller and treated as no state change; the next cycle
//! re-reads the instance and decides again.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::resilience::{call_with_timeout, CallTimeout};

/// Start or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
}

impl LifecycleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Start => "start",
            LifecycleAction::Stop => "stop",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the lifecycle API.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The probe showed we are not allowed to perform the action.
    #[error("permission denied for {action} on {instance_id}: {reason}")]
    PermissionDenied {
        action: LifecycleAction,
        instance_id: String,
        reason: String,
    },

    /// The API declined the call, typically because of the instance state.
    #[error("{action} rejected for {instance_id}: {reason}")]
    Rejected {
        action: LifecycleAction,
        instance_id: String,
        reason: String,
    },

    #[error("lifecycle request failed: {0}")]
    Transport(String),

    #[error("lifecycle {0}")]
    Timeout(#[from] CallTimeout),
}

impl LifecycleError {
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleError::PermissionDenied { .. } => "permission_denied",
            LifecycleError::Rejected { .. } => "rejected",
            LifecycleError::Transport(_) => "transport",
            LifecycleError::Timeout(_) => "timeout",
        }
    }
}

/// Instance lifecycle API.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Validate that `action` would be accepted, without performing it.
    async fn probe(&self, action: LifecycleAction, instance_id: &str) -> Result<(), LifecycleError>;

    /// Perform `action`.
    async fn execute(&self, action: LifecycleAction, instance_id: &str) -> Result<(), LifecycleError>;
}

/// How far a dispatched command got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Probe succeeded and the action was executed.
    Executed,
    /// Probe succeeded; execution skipped in dry-run mode.
    Probed,
}

/// Probe, then execute `action` against `instance_id`.
pub async fn dispatch(
    api: &dyn LifecycleApi,
    action: LifecycleAction,
    instance_id: &str,
    dry_run: bool,
    limit: Duration,
) -> Result<DispatchOutcome, LifecycleError> {
    call_with_timeout(limit, api.probe(action, instance_id)).await?;

    if dry_run {
        tracing::info!(action = %action, instance_id = %instance_id, "Dry run: probe succeeded, not executing");
        return Ok(DispatchOutcome::Probed);
    }

    call_with_timeout(limit, api.execute(action, instance_id)).await?;
    Ok(DispatchOutcome::Executed)
}
