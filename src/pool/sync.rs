//! Pool membership reconciliation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::inventory::InstanceRecord;
use crate::pool::{PoolApi, PoolDefinition, PoolMember, PoolSyncError};
use crate::resilience::call_with_timeout;

/// Every addressed instance, enabled, named by instance id, ordered by name.
pub fn desired_members(instances: &[InstanceRecord]) -> Vec<PoolMember> {
    let mut members: Vec<PoolMember> = instances
        .iter()
        .filter_map(|i| {
            i.address
                .as_ref()
                .map(|address| PoolMember::new(i.id.clone(), address.clone()))
        })
        .collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));
    members
}

fn member_key(member: &PoolMember) -> (&str, &str, bool) {
    (member.name.as_str(), member.address.as_str(), member.enabled)
}

/// Membership comparison on name, address and enabled flag only.
fn same_members(current: &[PoolMember], desired: &[PoolMember]) -> bool {
    current.len() == desired.len()
        && current.iter().map(member_key).collect::<HashSet<_>>() == desired.iter().map(member_key).collect::<HashSet<_>>()
}

/// Carry each current origin's extra settings onto the desired origin of the same name.
fn carry_origin_settings(current: &[PoolMember], desired: Vec<PoolMember>) -> Vec<PoolMember> {
    let existing: HashMap<&str, &PoolMember> = current.iter().map(|m| (m.name.as_str(), m)).collect();
    desired
        .into_iter()
        .map(|mut member| {
            if let Some(previous) = existing.get(member.name.as_str()) {
                for (key, value) in &previous.extra {
                    member.extra.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            member
        })
        .collect()
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolSyncOutcome {
    /// The origin list was rewritten.
    Replaced { members: usize },
    /// The pool already matched and `skip_unchanged` is set.
    Unchanged { members: usize },
}

/// Keeps the pool's origin list equal to the reachable instances.
#[derive(Clone)]
pub struct PoolSynchronizer {
    api: Arc<dyn PoolApi>,
    pool_id: String,
    skip_unchanged: bool,
    call_timeout: Duration,
}

impl PoolSynchronizer {
    pub fn new(api: Arc<dyn PoolApi>, pool_id: impl Into<String>, skip_unchanged: bool, call_timeout: Duration) -> Self {
        Self {
            api,
            pool_id: pool_id.into(),
            skip_unchanged,
            call_timeout,
        }
    }

    /// Replace the pool's origins with `desired`, preserving its metadata.
    pub async fn reconcile(&self, desired: Vec<PoolMember>) -> Result<PoolSyncOutcome, PoolSyncError> {
        let current = call_with_timeout(self.call_timeout, self.api.get_pool(&self.pool_id)).await?;
        let members = desired.len();

        if self.skip_unchanged && same_members(&current.origins, &desired) {
            tracing::debug!(pool_id = %self.pool_id, members, "Pool already up to date, skipping write");
            return Ok(PoolSyncOutcome::Unchanged { members });
        }

        let origins = carry_origin_settings(&current.origins, desired);
        let updated = PoolDefinition { origins, ..current };
        call_with_timeout(self.call_timeout, self.api.put_pool(&self.pool_id, &updated)).await?;

        tracing::info!(
            pool_id = %self.pool_id,
            pool_name = %updated.name,
            members,
            origins = ?updated.origins.iter().map(|m| m.address.as_str()).collect::<Vec<_>>(),
            "Pool origins replaced"
        );
        Ok(PoolSyncOutcome::Replaced { members })
    }
}

impl std::fmt::Debug for PoolSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolSynchronizer")
            .field("pool_id", &self.pool_id)
            .field("skip_unchanged", &self.skip_unchanged)
            .finish()
    }
}
