//! Standby failover controller library.
//!
//! Watches the load of a primary instance, starts or stops a standby to
//! absorb overload or replace a silent primary, and keeps a traffic pool in
//! sync with the instances that are reachable.

// Core subsystems
pub mod config;
pub mod failover;
pub mod health;
pub mod inventory;
pub mod pool;
pub mod scheduler;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::FailoverConfig;
pub use lifecycle::Shutdown;
pub use scheduler::{Controller, PollScheduler};
