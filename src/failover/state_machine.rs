//! Standby lifecycle decisions.
//!
//! # Precedence
//! ```text
//! 1. standby pending/stopping           → Noop (transition in flight)
//! 2. no usable primary                  → Start unless standby running
//! 3. primary not running / not reporting → Start unless standby running
//! 4. primary overloaded                 → Start unless standby running
//! 5. primary healthy                    → Stop unless standby stopped
//! ```
//!
//! Commands are edge-triggered: once the standby reaches the target state the
//! same inputs yield `Noop`.

use std::fmt;

use crate::failover::LifecycleAction;
use crate::health::HealthVerdict;
use crate::inventory::LifecycleState;

/// What the cycle learned about the primary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assessment {
    /// The snapshot produced no role assignment.
    NoPrimary,
    /// A primary was selected and its load evaluated.
    Primary {
        state: LifecycleState,
        verdict: HealthVerdict,
    },
}

/// Lifecycle command for the standby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Noop,
}

impl Command {
    pub fn action(self) -> Option<LifecycleAction> {
        match self {
            Command::Start => Some(LifecycleAction::Start),
            Command::Stop => Some(LifecycleAction::Stop),
            Command::Noop => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Noop => "noop",
        }
    }
}

/// Why a decision was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionReason {
    TransitionInFlight { standby: LifecycleState },
    NoUsablePrimary,
    PrimaryNotRunning { state: LifecycleState },
    PrimaryNotReporting { expected_buckets: usize, received_buckets: usize },
    PrimaryOverloaded { max_load: f64, threshold: f64 },
    PrimaryHealthy { max_load: f64 },
    NoStandbyCandidate,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::TransitionInFlight { standby } => write!(f, "standby transition in flight ({standby})"),
            DecisionReason::NoUsablePrimary => f.write_str("no usable primary"),
            DecisionReason::PrimaryNotRunning { state } => write!(f, "primary not running ({state})"),
            DecisionReason::PrimaryNotReporting {
                expected_buckets,
                received_buckets,
            } => write!(f, "primary not reporting ({received_buckets}/{expected_buckets} buckets)"),
            DecisionReason::PrimaryOverloaded { max_load, threshold } => {
                write!(f, "primary overloaded (max load {max_load:.2} > {threshold:.2})")
            }
            DecisionReason::PrimaryHealthy { max_load } => write!(f, "primary healthy (max load {max_load:.2})"),
            DecisionReason::NoStandbyCandidate => f.write_str("no standby candidate"),
        }
    }
}

/// A command together with the reason for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub command: Command,
    pub reason: DecisionReason,
}

impl Decision {
    fn new(command: Command, reason: DecisionReason) -> Self {
        Self { command, reason }
    }

    /// Noop decision used when there is no standby to act on.
    pub fn no_standby() -> Self {
        Self::new(Command::Noop, DecisionReason::NoStandbyCandidate)
    }
}

fn start_unless_running(standby: LifecycleState, reason: DecisionReason) -> Decision {
    if standby == LifecycleState::Running {
        Decision::new(Command::Noop, reason)
    } else {
        Decision::new(Command::Start, reason)
    }
}

/// Map the primary's assessment and the standby's state to a command.
pub fn decide(assessment: &Assessment, standby: LifecycleState) -> Decision {
    if standby.is_transitioning() {
        return Decision::new(Command::Noop, DecisionReason::TransitionInFlight { standby });
    }

    let (primary_state, verdict) = match assessment {
        Assessment::NoPrimary => return start_unless_running(standby, DecisionReason::NoUsablePrimary),
        Assessment::Primary { state, verdict } => (*state, *verdict),
    };

    if primary_state != LifecycleState::Running {
        return start_unless_running(standby, DecisionReason::PrimaryNotRunning { state: primary_state });
    }

    match verdict {
        HealthVerdict::NotReporting {
            expected_buckets,
            received_buckets,
        } => start_unless_running(
            standby,
            DecisionReason::PrimaryNotReporting {
                expected_buckets,
                received_buckets,
            },
        ),
        HealthVerdict::Overloaded { max_load, threshold } => {
            start_unless_running(standby, DecisionReason::PrimaryOverloaded { max_load, threshold })
        }
        HealthVerdict::Healthy { max_load } => {
            let reason = DecisionReason::PrimaryHealthy { max_load };
            if standby == LifecycleState::Stopped {
                Decision::new(Command::Noop, reason)
            } else {
                Decision::new(Command::Stop, reason)
            }
        }
    }
}
