//! Scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! Tick (immediately, then every interval):
//!     → cycle.rs
//!         inventory snapshot
//!         ├─ roles → health verdict → decision → lifecycle command
//!         └─ desired pool members → pool write
//!     → CycleReport (logged, counted)
//! ```
//!
//! # Design Decisions
//! - One cycle at a time; overdue ticks are skipped, not stacked
//! - A failed cycle never stops the schedule
//! - Nothing carries over between cycles except external state

pub mod cycle;
pub mod poll;

pub use cycle::{Controller, ControllerSettings, CycleError, CycleReport, DispatchStatus, FailoverOutcome, PoolOutcome};
pub use poll::PollScheduler;
