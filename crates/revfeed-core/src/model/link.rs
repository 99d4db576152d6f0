use crate::model::revision::Revision;
use crate::model::value::LinkRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of a relationship as seen from the item that carries it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LinkDirection {
    /// Reported directly by the upstream diff source
    #[serde(rename = "OUT")]
    Outgoing,
    /// Only ever produced by backward synthesis
    #[serde(rename = "IN")]
    Incoming,
}

/// Current relationship held by an item in the response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedItem {
    /// The item on the other end
    pub id: String,
    pub role_id: String,
    pub role_name: String,
    pub direction: LinkDirection,
}

impl LinkedItem {
    pub fn outgoing(target_id: impl Into<String>, role: &LinkRole) -> Self {
        Self {
            id: target_id.into(),
            role_id: role.id.clone(),
            role_name: role.name.clone(),
            direction: LinkDirection::Outgoing,
        }
    }

    pub fn incoming(origin_id: impl Into<String>, role: &LinkRole) -> Self {
        Self {
            id: origin_id.into(),
            role_id: role.id.clone(),
            role_name: role.opposite_name.clone(),
            direction: LinkDirection::Incoming,
        }
    }
}

/// Reverse relationship change waiting to be merged into its target
///
/// Keyed externally by the target item id. Equality covers the full
/// deduplication tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReverseLink {
    pub origin_id: String,
    pub revision: Revision,
    pub role_id: String,
    pub inverse_role_name: String,
    pub added: bool,
}

impl PendingReverseLink {
    fn same_event(&self, other: &PendingReverseLink) -> bool {
        self.origin_id == other.origin_id
            && self.revision == other.revision
            && self.role_id == other.role_id
            && self.added == other.added
    }

    /// True if an entry describing the same transition is already in `pending`
    pub fn is_duplicate_in(&self, pending: &[PendingReverseLink]) -> bool {
        pending.iter().any(|p| p.same_event(self))
    }
}

/// Role definitions seen while projecting item states in one request
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: BTreeMap<String, LinkRole>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, role: &LinkRole) {
        if !self.roles.contains_key(&role.id) {
            self.roles.insert(role.id.clone(), role.clone());
        }
    }

    pub fn get(&self, role_id: &str) -> Option<&LinkRole> {
        self.roles.get(role_id)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
