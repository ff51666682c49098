//! Shutdown coordination.
//!
//! The poll scheduler holds a receiver and checks it between cycles; a
//! receiver must exist before [`Shutdown::trigger`] or the signal is lost.

use tokio::sync::broadcast;

/// Broadcast handle used to stop the scheduler at its next cycle boundary.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for a task that should stop on shutdown.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every current subscriber. Returns how many were reached.
    pub fn trigger(&self) -> usize {
        let reached = self.tx.send(()).unwrap_or(0);
        tracing::debug!(subscribers = reached, "Shutdown triggered");
        reached
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
