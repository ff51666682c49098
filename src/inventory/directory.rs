//! Primary/standby role selection.
//!
//! # Responsibilities
//! - Pick the primary: addressed instance with the smallest id
//! - Pick the standby: next addressed instance in the same order
//! - Name a standby to start when no assignment can be made
//!
//! Ids are unique within a snapshot, so the order is total and the
//! selection does not depend on how the inventory enumerated them.

use crate::inventory::InstanceRecord;

/// The primary/standby pair derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub primary: InstanceRecord,
    pub standby: InstanceRecord,
}

fn addressed_in_order(instances: &[InstanceRecord]) -> Vec<&InstanceRecord> {
    let mut addressed: Vec<&InstanceRecord> = instances.iter().filter(|i| i.is_addressed()).collect();
    addressed.sort_by(|a, b| a.id.cmp(&b.id));
    addressed
}

/// Addressed instance with the lexicographically smallest id.
pub fn select_primary(instances: &[InstanceRecord]) -> Option<&InstanceRecord> {
    addressed_in_order(instances).into_iter().next()
}

/// First addressed instance after `primary` in id order.
pub fn select_backup<'a>(instances: &'a [InstanceRecord], primary: &InstanceRecord) -> Option<&'a InstanceRecord> {
    addressed_in_order(instances)
        .into_iter()
        .find(|i| i.id != primary.id)
}

/// Both roles, or nothing when fewer than two addressed instances exist.
pub fn assign_roles(instances: &[InstanceRecord]) -> Option<RoleAssignment> {
    let primary = select_primary(instances)?;
    let standby = select_backup(instances, primary)?;
    Some(RoleAssignment {
        primary: primary.clone(),
        standby: standby.clone(),
    })
}

/// Standby to act on when [`assign_roles`] produced nothing.
///
/// A pinned id wins when it is present in the snapshot. Otherwise the last
/// instance in id order that is not the selected primary, so a two-instance
/// group keeps the same standby whether or not it currently has an address.
pub fn fallback_standby<'a>(instances: &'a [InstanceRecord], pinned: Option<&str>) -> Option<&'a InstanceRecord> {
    if let Some(id) = pinned {
        if let Some(found) = instances.iter().find(|i| i.id == id) {
            return Some(found);
        }
        tracing::warn!(standby_id = %id, "Pinned standby not present in inventory");
    }

    let primary_id = select_primary(instances).map(|p| p.id.as_str());
    instances
        .iter()
        .filter(|i| Some(i.id.as_str()) != primary_id)
        .max_by(|a, b| a.id.cmp(&b.id))
}
