//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap every collaborator call with a deadline
//! - Turn an elapsed deadline into the caller's own error type
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - A timed-out call is dropped, never retried within the cycle

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

/// A collaborator call exceeded its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("call timed out after {}ms", .limit.as_millis())]
pub struct CallTimeout {
    pub limit: Duration,
}

/// Run `fut` under `limit`, mapping an elapsed deadline into `E`.
pub async fn call_with_timeout<T, E, F>(limit: Duration, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<CallTimeout>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CallTimeout { limit }.into()),
    }
}
