use crate::model::link::{LinkDirection, LinkedItem};
use crate::model::revision::Revision;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field-level change reported to the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldChange {
    #[serde(rename_all = "camelCase")]
    Scalar {
        field_name: String,
        before: String,
        after: String,
    },
    #[serde(rename_all = "camelCase")]
    Collection {
        field_name: String,
        added: Vec<String>,
        removed: Vec<String>,
    },
    /// Collection change on a relationship field, qualified by role and direction
    #[serde(rename_all = "camelCase")]
    Relationship {
        field_name: String,
        link_role_id: String,
        link_role_name: String,
        link_direction: LinkDirection,
        added: Vec<String>,
        removed: Vec<String>,
    },
}

impl FieldChange {
    pub fn field_name(&self) -> &str {
        match self {
            FieldChange::Scalar { field_name, .. }
            | FieldChange::Collection { field_name, .. }
            | FieldChange::Relationship { field_name, .. } => field_name,
        }
    }
}

/// Field changes observed when moving an item to one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub revision: Revision,
    pub field_changes: Vec<FieldChange>,
}

impl ChangeRecord {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            field_changes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateType {
    Updated,
    Deleted,
}

/// Stringified state value: scalars collapse to text, collections to lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Text(String),
    List(Vec<String>),
}

/// Resolved end-of-window state of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemState {
    pub uri: String,
    pub item_type: String,
    pub fields: BTreeMap<String, StateValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, StateValue>,
}

/// One item's entry in the feed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChangeSet {
    pub id: String,
    pub update_type: UpdateType,
    /// Revision of the resolved state, or of the last change for DELETED markers
    pub revision: Revision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ItemState>,
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
    #[serde(default)]
    pub linked_items: Vec<LinkedItem>,
}

impl ItemChangeSet {
    pub fn updated(
        id: impl Into<String>,
        revision: Revision,
        state: ItemState,
        linked_items: Vec<LinkedItem>,
        changes: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            id: id.into(),
            update_type: UpdateType::Updated,
            revision,
            state: Some(state),
            changes,
            linked_items,
        }
    }

    /// Marker for an item removed from its container
    pub fn deleted(id: impl Into<String>, revision: Revision) -> Self {
        Self {
            id: id.into(),
            update_type: UpdateType::Deleted,
            revision,
            state: None,
            changes: Vec::new(),
            linked_items: Vec::new(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.update_type == UpdateType::Deleted
    }

    /// Find or create the record at `revision`, keeping records ordered
    pub fn record_at_mut(&mut self, revision: Revision) -> &mut ChangeRecord {
        let idx = match self
            .changes
            .binary_search_by(|record| record.revision.cmp(&revision))
        {
            Ok(idx) => idx,
            Err(idx) => {
                self.changes.insert(idx, ChangeRecord::new(revision));
                idx
            }
        };
        &mut self.changes[idx]
    }
}
