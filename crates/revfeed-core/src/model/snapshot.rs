use crate::model::revision::{Revision, Revisioned};
use crate::model::value::{Element, FieldValue, LinkRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name under which relationship changes are reported
pub const LINKED_ITEMS_FIELD: &str = "linkedWorkItems";

/// Immutable capture of an item's full state at one revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub item_id: String,
    pub revision: Revision,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub item_type: String,
    /// Standard fields keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, FieldValue>,
    /// Outgoing relationships held at this revision
    #[serde(default)]
    pub links: Vec<SnapshotLink>,
}

impl Snapshot {
    pub fn new(item_id: impl Into<String>, revision: impl Into<Revision>) -> Self {
        Self {
            item_id: item_id.into(),
            revision: revision.into(),
            uri: String::new(),
            item_type: String::new(),
            fields: BTreeMap::new(),
            custom_fields: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_custom_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.custom_fields.insert(name.into(), value);
        self
    }

    pub fn with_link(mut self, target_id: impl Into<String>, role: &LinkRole) -> Self {
        self.links.push(SnapshotLink {
            target_id: target_id.into(),
            role: role.clone(),
        });
        self
    }
}

impl Revisioned for Snapshot {
    fn revision(&self) -> Revision {
        self.revision
    }
}

/// One outgoing relationship in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLink {
    pub target_id: String,
    pub role: LinkRole,
}

impl SnapshotLink {
    pub fn to_element(&self) -> Element {
        Element::relationship(self.target_id.clone(), &self.role)
    }
}

/// Difference for one field between two adjacent snapshots, as reported by
/// the upstream diff source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FieldDiff {
    Scalar {
        field: String,
        before: FieldValue,
        after: FieldValue,
    },
    Collection {
        field: String,
        #[serde(default)]
        added: Vec<Element>,
        #[serde(default)]
        removed: Vec<Element>,
    },
}

impl FieldDiff {
    pub fn field_name(&self) -> &str {
        match self {
            FieldDiff::Scalar { field, .. } | FieldDiff::Collection { field, .. } => field,
        }
    }
}
