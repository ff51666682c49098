//! Poll loop.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::health::window::now_millis;
use crate::scheduler::cycle::{Controller, CycleReport};

/// Runs a cycle immediately, then once per interval until shutdown.
#[derive(Debug)]
pub struct PollScheduler {
    controller: Controller,
    interval: Duration,
}

impl PollScheduler {
    pub fn new(controller: Controller, interval: Duration) -> Self {
        Self { controller, interval }
    }

    /// Run a single cycle now.
    pub async fn run_once(&self) -> CycleReport {
        self.controller.run_cycle(now_millis()).await
    }

    /// Loop until a shutdown signal arrives.
    ///
    /// Cycles run inline, so they never overlap; a tick that falls due while
    /// a cycle is still running is skipped rather than queued. Shutdown is
    /// observed between cycles, letting an in-progress cycle finish.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Poll scheduler starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Poll scheduler received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }
}
