//! Seed Format v0 schema
//!
//! Defines the YAML structure for seed import. Field values may be written
//! as plain YAML scalars or in the tagged form the feed model serializes to:
//!
//! ```yaml
//! title: Login form
//! priority: 3
//! status: { type: enum, value: { id: open } }
//! categories: [ui, auth]
//! ```

use revfeed_core::model::{Element, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    pub project: SeedProject,

    #[serde(default)]
    pub containers: Vec<SeedContainer>,

    #[serde(default)]
    pub link_roles: Vec<SeedLinkRole>,

    #[serde(default)]
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProject {
    pub id: String,
}

/// Container addressed by `{project}/{space}/{document}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedContainer {
    pub id: String,
    pub space: String,
    pub document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLinkRole {
    pub id: String,
    pub name: String,
    pub opposite_name: String,
}

/// Item with its full snapshot history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedItem {
    pub id: String,

    /// Container id the item is recorded against
    pub container: String,

    #[serde(rename = "type")]
    pub item_type: String,

    /// Item was removed from its container
    #[serde(default)]
    pub removed: bool,

    /// Revision of the latest change; defaults to the last snapshot's revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_revision: Option<u64>,

    /// Ascending by revision; may be empty for items without history support
    #[serde(default)]
    pub snapshots: Vec<SeedSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSnapshot {
    pub revision: u64,

    #[serde(default)]
    pub fields: BTreeMap<String, SeedValue>,

    #[serde(default)]
    pub custom_fields: BTreeMap<String, SeedValue>,

    #[serde(default)]
    pub links: Vec<SeedLink>,
}

/// Outgoing link held at one revision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLink {
    pub target: String,
    pub role: String,
}

/// Field value as written in a seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Typed(FieldValue),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// List of option ids
    Options(Vec<String>),
    Null,
}

impl SeedValue {
    pub fn to_field_value(&self) -> FieldValue {
        match self {
            SeedValue::Typed(value) => value.clone(),
            SeedValue::Boolean(b) => FieldValue::Boolean(*b),
            SeedValue::Integer(i) => FieldValue::Integer(*i),
            SeedValue::Float(f) => FieldValue::Float(*f),
            SeedValue::Text(s) => FieldValue::Text(s.clone()),
            SeedValue::Options(ids) => FieldValue::List(
                ids.iter()
                    .map(|id| Element::EnumOption { id: id.clone() })
                    .collect(),
            ),
            SeedValue::Null => FieldValue::Null,
        }
    }
}

impl SeedItem {
    /// Revision the catalog reports for this item
    pub fn effective_last_revision(&self) -> Option<u64> {
        self.last_revision
            .or_else(|| self.snapshots.last().map(|s| s.revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_seed() {
        let yaml = r#"
schema_version: 0
project:
  id: ACME
containers:
  - id: c1
    space: _default
    document: Requirements
items:
  - id: WI-1
    container: c1
    type: requirement
    snapshots:
      - revision: 3
        fields:
          title: Login
"#;

        let seed: SeedV0 = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(seed.schema_version, 0);
        assert_eq!(seed.project.id, "ACME");
        assert_eq!(seed.items.len(), 1);
        assert!(!seed.items[0].removed);
        assert_eq!(seed.items[0].effective_last_revision(), Some(3));
    }

    #[test]
    fn test_plain_and_typed_values() {
        let yaml = r#"
title: Login
priority: 3
ratio: 0.5
done: false
status: { type: enum, value: { id: open } }
categories: [ui, auth]
resolution: ~
"#;
        let fields: BTreeMap<String, SeedValue> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fields["title"].to_field_value(), FieldValue::text("Login"));
        assert_eq!(fields["priority"].to_field_value(), FieldValue::Integer(3));
        assert_eq!(fields["ratio"].to_field_value(), FieldValue::Float(0.5));
        assert_eq!(fields["done"].to_field_value(), FieldValue::Boolean(false));
        assert_eq!(fields["status"].to_field_value(), FieldValue::enum_id("open"));
        assert_eq!(
            fields["categories"].to_field_value().as_elements().map(<[_]>::len),
            Some(2)
        );
        assert!(fields["resolution"].to_field_value().is_null());
    }

    #[test]
    fn test_explicit_last_revision_wins() {
        let item: SeedItem = serde_yaml::from_str(
            "{ id: WI-9, container: c1, type: task, last_revision: 12 }",
        )
        .unwrap();
        assert_eq!(item.effective_last_revision(), Some(12));
    }
}
