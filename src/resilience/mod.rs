//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Collaborator call (inventory, metrics, lifecycle, pool):
//!     → timeouts.rs (enforce per-call deadline)
//!     → On failure: error surfaced to the cycle, retried on the next tick
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - The deadline is bounded well under the poll interval
//! - No retries inside a cycle: the next poll is the retry

pub mod timeouts;

pub use timeouts::{call_with_timeout, CallTimeout};
