//! Backward link synthesis
//!
//! The diff source only reports a relationship change on the item that
//! holds the link. The opposite end is reconstructed here in two passes,
//! both run after every item of a batch has been walked:
//!
//! - [`BacklinkRegistry::merge_changes`] turns registered link transitions
//!   into IN relationship changes on the target's change records.
//! - [`synthesize_current_links`] mirrors every OUT [`LinkedItem`] between
//!   two reported items as an IN entry on the target.

use crate::model::{
    FieldChange, ItemChangeSet, LinkDirection, LinkRole, LinkedItem, PendingReverseLink, Revision,
    RoleTable, LINKED_ITEMS_FIELD,
};
use std::collections::BTreeMap;

/// Reverse link transitions waiting for their target, keyed by target id
#[derive(Debug, Default)]
pub struct BacklinkRegistry {
    pending: BTreeMap<String, Vec<PendingReverseLink>>,
}

impl BacklinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `origin_id` gained (`added`) or lost a link to `target_id`
    /// at `revision`
    ///
    /// Returns `false` when the same transition was already registered.
    pub fn register(
        &mut self,
        origin_id: &str,
        revision: Revision,
        target_id: &str,
        role: &LinkRole,
        added: bool,
    ) -> bool {
        let entry = PendingReverseLink {
            origin_id: origin_id.to_string(),
            revision,
            role_id: role.id.clone(),
            inverse_role_name: role.opposite_name.clone(),
            added,
        };
        let pending = self.pending.entry(target_id.to_string()).or_default();
        if entry.is_duplicate_in(pending) {
            return false;
        }
        pending.push(entry);
        true
    }

    pub fn pending_for(&self, target_id: &str) -> &[PendingReverseLink] {
        self.pending.get(target_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge pending transitions into the change sets of their targets
    ///
    /// Pending entries are consumed, so a second call merges nothing. Targets
    /// absent from `results` or reported as DELETED are skipped. Returns the
    /// number of merged transitions.
    pub fn merge_changes(&mut self, results: &mut BTreeMap<String, ItemChangeSet>) -> usize {
        let mut merged = 0;
        for (target_id, entries) in std::mem::take(&mut self.pending) {
            let Some(target) = results.get_mut(&target_id) else {
                continue;
            };
            if target.is_deleted() {
                continue;
            }
            for entry in entries {
                merge_one(target, entry);
                merged += 1;
            }
        }
        merged
    }
}

fn merge_one(target: &mut ItemChangeSet, entry: PendingReverseLink) {
    let record = target.record_at_mut(entry.revision);

    let position = record.field_changes.iter().position(|change| {
        matches!(change, FieldChange::Relationship {
            field_name,
            link_role_id,
            link_direction: LinkDirection::Incoming,
            ..
        } if field_name == LINKED_ITEMS_FIELD && link_role_id == &entry.role_id)
    });

    let idx = match position {
        Some(idx) => idx,
        None => {
            record.field_changes.push(FieldChange::Relationship {
                field_name: LINKED_ITEMS_FIELD.to_string(),
                link_role_id: entry.role_id.clone(),
                link_role_name: entry.inverse_role_name.clone(),
                link_direction: LinkDirection::Incoming,
                added: Vec::new(),
                removed: Vec::new(),
            });
            record.field_changes.len() - 1
        }
    };

    if let FieldChange::Relationship { added, removed, .. } = &mut record.field_changes[idx] {
        let bucket = if entry.added { added } else { removed };
        if !bucket.contains(&entry.origin_id) {
            bucket.push(entry.origin_id);
        }
    }
}

/// Add an IN [`LinkedItem`] on every reported target of an OUT link
///
/// Roles are resolved through `roles`; links whose role was never seen
/// while projecting are left alone. Returns the number of entries added.
pub fn synthesize_current_links(
    results: &mut BTreeMap<String, ItemChangeSet>,
    roles: &RoleTable,
) -> usize {
    let mut incoming: Vec<(String, LinkedItem)> = Vec::new();
    for (origin_id, set) in results.iter() {
        for link in &set.linked_items {
            if link.direction != LinkDirection::Outgoing {
                continue;
            }
            let Some(role) = roles.get(&link.role_id) else {
                tracing::debug!(role_id = %link.role_id, "link role unknown, no incoming entry");
                continue;
            };
            incoming.push((link.id.clone(), LinkedItem::incoming(origin_id.clone(), role)));
        }
    }

    let mut added = 0;
    for (target_id, linked) in incoming {
        let Some(target) = results.get_mut(&target_id) else {
            continue;
        };
        if target.is_deleted() || target.linked_items.contains(&linked) {
            continue;
        }
        target.linked_items.push(linked);
        added += 1;
    }
    added
}
