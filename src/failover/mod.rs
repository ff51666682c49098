//! Failover decision subsystem.
//!
//! # Data Flow
//! ```text
//! RoleAssignment + HealthVerdict + standby lifecycle state
//!     → state_machine.rs (Start / Stop / Noop with a reason)
//!     → commands.rs (probe, then execute)
//!     → client.rs (lifecycle HTTP API)
//! ```
//!
//! # Design Decisions
//! - The standby's state is read from the inventory, never tracked locally
//! - Nothing is issued while a start/stop is still in flight
//! - A rejected command is a no-op; the next cycle re-evaluates

pub mod client;
pub mod commands;
pub mod state_machine;

pub use client::HttpLifecycleApi;
pub use commands::{dispatch, DispatchOutcome, LifecycleAction, LifecycleApi, LifecycleError};
pub use state_machine::{decide, Assessment, Command, Decision, DecisionReason};
