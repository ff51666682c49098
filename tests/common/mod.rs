//! Shared in-memory collaborators for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use standby_failover::config::FailoverConfig;
use standby_failover::failover::{LifecycleAction, LifecycleApi, LifecycleError};
use standby_failover::health::{LoadQuery, MetricsError, MetricsStore};
use standby_failover::inventory::{InstanceInventory, InstanceRecord, InventoryError, LifecycleState, TagSelector};
use standby_failover::pool::{PoolApi, PoolDefinition, PoolMember, PoolSyncError};
use standby_failover::Controller;

pub fn instance(id: &str, address: Option<&str>, state: LifecycleState) -> InstanceRecord {
    InstanceRecord::new(id, address.map(String::from), state)
}

/// Inventory and lifecycle API sharing one set of instances.
///
/// Executed commands move the standby into its transitional state, like a
/// real provider would; tests call [`FakeCloud::settle`] to finish them.
#[derive(Default)]
pub struct FakeCloud {
    instances: Mutex<Vec<InstanceRecord>>,
    pub calls: Mutex<Vec<String>>,
    pub inventory_calls: AtomicUsize,
    pub fail_inventory: AtomicBool,
    pub hang_inventory: AtomicBool,
    pub reject_execute: AtomicBool,
}

impl FakeCloud {
    pub fn new(instances: Vec<InstanceRecord>) -> Arc<Self> {
        Arc::new(Self {
            instances: Mutex::new(instances),
            ..Default::default()
        })
    }

    pub fn set_instances(&self, instances: Vec<InstanceRecord>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub fn state_of(&self, id: &str) -> Option<LifecycleState> {
        self.instances.lock().unwrap().iter().find(|i| i.id == id).map(|i| i.state)
    }

    /// Complete any in-flight transition.
    pub fn settle(&self) {
        for instance in self.instances.lock().unwrap().iter_mut() {
            instance.state = match instance.state {
                LifecycleState::Pending => LifecycleState::Running,
                LifecycleState::Stopping => LifecycleState::Stopped,
                other => other,
            };
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("execute:"))
            .collect()
    }
}

#[async_trait]
impl InstanceInventory for FakeCloud {
    async fn list_instances(&self, _selector: &TagSelector) -> Result<Vec<InstanceRecord>, InventoryError> {
        self.inventory_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_inventory.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_inventory.load(Ordering::SeqCst) {
            return Err(InventoryError::Transport("connection refused".into()));
        }
        Ok(self.instances.lock().unwrap().clone())
    }
}

#[async_trait]
impl LifecycleApi for FakeCloud {
    async fn probe(&self, action: LifecycleAction, instance_id: &str) -> Result<(), LifecycleError> {
        self.calls.lock().unwrap().push(format!("probe:{action}:{instance_id}"));
        Ok(())
    }

    async fn execute(&self, action: LifecycleAction, instance_id: &str) -> Result<(), LifecycleError> {
        self.calls.lock().unwrap().push(format!("execute:{action}:{instance_id}"));
        if self.reject_execute.load(Ordering::SeqCst) {
            return Err(LifecycleError::Rejected {
                action,
                instance_id: instance_id.to_string(),
                reason: "IncorrectInstanceState".into(),
            });
        }

        let mut instances = self.instances.lock().unwrap();
        if let Some(instance) = instances.iter_mut().find(|i| i.id == instance_id) {
            instance.state = match action {
                LifecycleAction::Start => LifecycleState::Pending,
                LifecycleAction::Stop => LifecycleState::Stopping,
            };
        }
        Ok(())
    }
}

/// Metrics store returning scripted bucket means.
#[derive(Default)]
pub struct FakeMetrics {
    means: Mutex<Vec<f64>>,
    pub queries: Mutex<Vec<LoadQuery>>,
    pub fail: AtomicBool,
}

impl FakeMetrics {
    pub fn new(means: Vec<f64>) -> Arc<Self> {
        Arc::new(Self {
            means: Mutex::new(means),
            ..Default::default()
        })
    }

    pub fn set_means(&self, means: Vec<f64>) {
        *self.means.lock().unwrap() = means;
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl MetricsStore for FakeMetrics {
    async fn bucket_means(&self, query: &LoadQuery) -> Result<Vec<f64>, MetricsError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(MetricsError::Query("database not found: telegraf".into()));
        }
        Ok(self.means.lock().unwrap().clone())
    }
}

/// Pool API holding one pool definition in memory.
pub struct FakePool {
    pub pool: Mutex<PoolDefinition>,
    pub writes: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl FakePool {
    pub fn new(origins: Vec<PoolMember>) -> Arc<Self> {
        Arc::new(Self {
            pool: Mutex::new(PoolDefinition {
                name: "web-pool".into(),
                description: Some("failover pool".into()),
                enabled: Some(true),
                minimum_origins: Some(1),
                monitor: Some("monitor-1".into()),
                notification_email: Some("ops@example.com".into()),
                origins,
                extra: Default::default(),
            }),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        })
    }

    pub fn origins(&self) -> Vec<PoolMember> {
        self.pool.lock().unwrap().origins.clone()
    }
}

#[async_trait]
impl PoolApi for FakePool {
    async fn get_pool(&self, _pool_id: &str) -> Result<PoolDefinition, PoolSyncError> {
        Ok(self.pool.lock().unwrap().clone())
    }

    async fn put_pool(&self, pool_id: &str, pool: &PoolDefinition) -> Result<(), PoolSyncError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PoolSyncError::Write {
                pool_id: pool_id.to_string(),
                reason: "1000: internal error".into(),
            });
        }
        *self.pool.lock().unwrap() = pool.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn member(name: &str, address: &str) -> PoolMember {
    PoolMember::new(name, address)
}

pub fn test_config() -> FailoverConfig {
    let mut config = FailoverConfig::default();
    config.inventory.tag_value = "web".into();
    config.inventory.region = "eu-west-1".into();
    config.inventory.api_token = "inv-token".into();
    config.pool.account_id = "acct".into();
    config.pool.pool_id = "pool-1".into();
    config.pool.api_token = "pool-token".into();
    config.scheduler.interval_ms = 60_000;
    config.scheduler.call_timeout_ms = 5_000;
    config
}

pub fn controller_with(
    config: &FailoverConfig,
    cloud: &Arc<FakeCloud>,
    metrics: &Arc<FakeMetrics>,
    pool: &Arc<FakePool>,
) -> Controller {
    Controller::from_config(config, cloud.clone(), metrics.clone(), cloud.clone(), pool.clone())
}

pub fn controller(cloud: &Arc<FakeCloud>, metrics: &Arc<FakeMetrics>, pool: &Arc<FakePool>) -> Controller {
    controller_with(&test_config(), cloud, metrics, pool)
}

pub const NOW_MS: u64 = 1_700_000_000_000;
