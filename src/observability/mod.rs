//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every cycle produces:
//!     → logging.rs (structured log events inside a `cycle` span)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every error is logged with its cycle id; nothing is swallowed
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
