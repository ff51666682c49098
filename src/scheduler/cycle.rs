//! One control cycle.
//!
//! # Responsibilities
//! - Take one inventory snapshot
//! - Derive roles, evaluate the primary, decide and dispatch a standby command
//! - Reconcile the traffic pool from the same snapshot
//! - Report every failure through logs and metrics, never as a panic
//!
//! # Design Decisions
//! - Inventory failure aborts the whole cycle; there is no snapshot to act on
//! - Metrics failure aborts only the decision; the pool is still synced
//! - Lifecycle and pool failures are independent of each other

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::FailoverConfig;
use crate::failover::{
    decide, dispatch, Assessment, Decision, DispatchOutcome, LifecycleAction, LifecycleApi, LifecycleError,
};
use crate::health::{HealthEvaluator, MetricsError, MetricsStore};
use crate::inventory::{
    assign_roles, fallback_standby, InstanceInventory, InstanceRecord, InventoryError, TagSelector,
};
use crate::observability::metrics;
use crate::pool::{desired_members, PoolApi, PoolSyncError, PoolSyncOutcome, PoolSynchronizer};
use crate::resilience::call_with_timeout;

/// Why a cycle made no decision.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// What happened to the dispatched command.
#[derive(Debug)]
pub enum DispatchStatus {
    Completed(DispatchOutcome),
    Failed(LifecycleError),
}

/// Failover half of a cycle.
#[derive(Debug)]
pub enum FailoverOutcome {
    /// No decision was made.
    Aborted(CycleError),
    Decided {
        standby_id: Option<String>,
        decision: Decision,
        /// `None` when the decision was `Noop`.
        dispatch: Option<DispatchStatus>,
    },
}

/// Pool half of a cycle.
#[derive(Debug)]
pub enum PoolOutcome {
    Synced(PoolSyncOutcome),
    Failed(PoolSyncError),
    /// No inventory snapshot to sync from.
    Skipped,
}

/// Summary of one cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub failover: FailoverOutcome,
    pub pool: PoolOutcome,
}

impl CycleReport {
    /// Metric label summarising the cycle.
    pub fn outcome_label(&self) -> &'static str {
        let failover_ok = matches!(
            self.failover,
            FailoverOutcome::Decided {
                dispatch: None | Some(DispatchStatus::Completed(_)),
                ..
            }
        );
        match (&self.failover, failover_ok, &self.pool) {
            (FailoverOutcome::Aborted(CycleError::Inventory(_)), _, _) => "aborted",
            (_, true, PoolOutcome::Synced(_)) => "ok",
            _ => "degraded",
        }
    }
}

/// Per-cycle settings taken from the validated config.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub selector: TagSelector,
    pub standby_pin: Option<String>,
    pub dry_run: bool,
    pub call_timeout: Duration,
}

/// Runs control cycles against the four collaborators.
#[derive(Clone)]
pub struct Controller {
    inventory: Arc<dyn InstanceInventory>,
    evaluator: HealthEvaluator,
    lifecycle: Arc<dyn LifecycleApi>,
    pool: PoolSynchronizer,
    settings: ControllerSettings,
}

impl Controller {
    pub fn new(
        inventory: Arc<dyn InstanceInventory>,
        evaluator: HealthEvaluator,
        lifecycle: Arc<dyn LifecycleApi>,
        pool: PoolSynchronizer,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            inventory,
            evaluator,
            lifecycle,
            pool,
            settings,
        }
    }

    /// Wire a controller from config and collaborator implementations.
    pub fn from_config(
        config: &FailoverConfig,
        inventory: Arc<dyn InstanceInventory>,
        metrics_store: Arc<dyn MetricsStore>,
        lifecycle: Arc<dyn LifecycleApi>,
        pool_api: Arc<dyn PoolApi>,
    ) -> Self {
        let call_timeout = Duration::from_millis(config.scheduler.call_timeout_ms);
        let settings = ControllerSettings {
            selector: TagSelector {
                key: config.inventory.tag_key.clone(),
                value: config.inventory.tag_value.clone(),
            },
            standby_pin: config.failover.standby_instance_id.clone(),
            dry_run: config.failover.dry_run,
            call_timeout,
        };

        Self::new(
            inventory,
            HealthEvaluator::new(metrics_store, config.health.clone()),
            lifecycle,
            PoolSynchronizer::new(pool_api, config.pool.pool_id.clone(), config.pool.skip_unchanged, call_timeout),
            settings,
        )
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Run one full cycle with the wall clock read as `now_ms`.
    pub async fn run_cycle(&self, now_ms: u64) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", cycle_id = %cycle_id);

        let report = async {
            tracing::info!(dry_run = self.settings.dry_run, "Cycle started");

            let instances = match call_with_timeout(
                self.settings.call_timeout,
                self.inventory.list_instances(&self.settings.selector),
            )
            .await
            {
                Ok(instances) => instances,
                Err(e) => {
                    tracing::error!(error = %e, "Inventory unavailable, skipping cycle");
                    return CycleReport {
                        cycle_id,
                        failover: FailoverOutcome::Aborted(e.into()),
                        pool: PoolOutcome::Skipped,
                    };
                }
            };

            tracing::debug!(
                instances = instances.len(),
                addressed = instances.iter().filter(|i| i.is_addressed()).count(),
                "Inventory snapshot taken"
            );

            let failover = self.run_failover(&instances, now_ms).await;
            let pool = self.sync_pool(&instances).await;

            CycleReport {
                cycle_id,
                failover,
                pool,
            }
        }
        .instrument(span.clone())
        .await;

        let outcome = report.outcome_label();
        metrics::record_cycle(outcome);
        span.in_scope(|| tracing::info!(outcome, "Cycle finished"));
        report
    }

    async fn run_failover(&self, instances: &[InstanceRecord], now_ms: u64) -> FailoverOutcome {
        let roles = assign_roles(instances);

        let (assessment, standby) = match &roles {
            Some(roles) => {
                let evaluation = call_with_timeout(
                    self.settings.call_timeout,
                    self.evaluator.evaluate(&roles.primary.id, now_ms),
                )
                .await;

                let verdict = match evaluation {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        tracing::error!(primary_id = %roles.primary.id, error = %e, "Health evaluation failed, no decision this cycle");
                        return FailoverOutcome::Aborted(e.into());
                    }
                };
                if let Some(max_load) = verdict.max_load() {
                    metrics::record_primary_load(max_load);
                }

                tracing::info!(
                    primary_id = %roles.primary.id,
                    primary_state = %roles.primary.state,
                    standby_id = %roles.standby.id,
                    verdict = %verdict,
                    "Roles assigned"
                );
                let assessment = Assessment::Primary {
                    state: roles.primary.state,
                    verdict,
                };
                (assessment, Some(&roles.standby))
            }
            None => {
                let standby = fallback_standby(instances, self.settings.standby_pin.as_deref());
                tracing::warn!(
                    standby_id = ?standby.map(|s| s.id.as_str()),
                    "Fewer than two addressed instances, no usable primary"
                );
                (Assessment::NoPrimary, standby)
            }
        };

        let Some(standby) = standby else {
            let decision = Decision::no_standby();
            tracing::warn!(reason = %decision.reason, "Nothing to act on");
            return FailoverOutcome::Decided {
                standby_id: None,
                decision,
                dispatch: None,
            };
        };

        let decision = decide(&assessment, standby.state);
        tracing::info!(
            command = decision.command.as_str(),
            reason = %decision.reason,
            standby_id = %standby.id,
            standby_state = %standby.state,
            "Decision made"
        );

        let dispatch = match decision.command.action() {
            Some(action) => Some(self.dispatch_command(action, &standby.id).await),
            None => None,
        };

        FailoverOutcome::Decided {
            standby_id: Some(standby.id.clone()),
            decision,
            dispatch,
        }
    }

    async fn dispatch_command(&self, action: LifecycleAction, standby_id: &str) -> DispatchStatus {
        let result = dispatch(
            self.lifecycle.as_ref(),
            action,
            standby_id,
            self.settings.dry_run,
            self.settings.call_timeout,
        )
        .await;

        match result {
            Ok(outcome) => {
                let label = match outcome {
                    DispatchOutcome::Executed => "executed",
                    DispatchOutcome::Probed => "probed",
                };
                metrics::record_command(action.as_str(), label);
                tracing::info!(action = %action, standby_id = %standby_id, result = label, "Lifecycle command issued");
                DispatchStatus::Completed(outcome)
            }
            Err(e) => {
                metrics::record_command(action.as_str(), e.label());
                tracing::warn!(action = %action, standby_id = %standby_id, error = %e, "Lifecycle command not applied");
                DispatchStatus::Failed(e)
            }
        }
    }

    async fn sync_pool(&self, instances: &[InstanceRecord]) -> PoolOutcome {
        let desired = desired_members(instances);
        match self.pool.reconcile(desired).await {
            Ok(outcome) => {
                let (label, members) = match outcome {
                    PoolSyncOutcome::Replaced { members } => ("replaced", members),
                    PoolSyncOutcome::Unchanged { members } => ("unchanged", members),
                };
                metrics::record_pool_sync(label, Some(members));
                PoolOutcome::Synced(outcome)
            }
            Err(e) => {
                metrics::record_pool_sync("failed", None);
                tracing::error!(error = %e, "Pool sync failed");
                PoolOutcome::Failed(e)
            }
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("settings", &self.settings)
            .field("evaluator", &self.evaluator)
            .field("pool", &self.pool)
            .finish()
    }
}
