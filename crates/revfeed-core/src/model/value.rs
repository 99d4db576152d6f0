use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field value captured in a snapshot
///
/// Collections hold [`Element`]s, whose explicit discriminant tells the
/// classifier how to serialize an added or removed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Instant in UTC
    Date(DateTime<Utc>),
    /// Upstream duration notation such as `1d 4h`
    Duration(String),
    /// Enumeration option, reported by id
    Enum { id: String },
    User { id: String },
    Location { path: String },
    List(Vec<Element>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn enum_id(id: impl Into<String>) -> Self {
        FieldValue::Enum { id: id.into() }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Elements of a list value; `Null` reads as the empty list
    pub fn as_elements(&self) -> Option<&[Element]> {
        match self {
            FieldValue::List(elements) => Some(elements),
            FieldValue::Null => Some(&[]),
            _ => None,
        }
    }
}

/// Single entry of a collection field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Hyperlink {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
    },
    /// Outgoing relationship to another item
    Relationship { target_id: String, role: LinkRole },
    Approval {
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
    /// Enumeration option or untyped id
    EnumOption { id: String },
    /// Reference to an upstream object (user, category, plan, attachment, ...)
    Entity {
        entity_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    /// Payload the upstream could not type
    Opaque { value: serde_json::Value },
}

impl Element {
    pub fn relationship(target_id: impl Into<String>, role: &LinkRole) -> Self {
        Element::Relationship {
            target_id: target_id.into(),
            role: role.clone(),
        }
    }

    pub fn entity(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Element::Entity {
            entity_type: entity_type.into(),
            id: Some(id.into()),
        }
    }

    /// Name of the variant, used when reporting shape mismatches
    pub fn shape(&self) -> &'static str {
        match self {
            Element::Hyperlink { .. } => "hyperlink",
            Element::Relationship { .. } => "relationship",
            Element::Approval { .. } => "approval",
            Element::EnumOption { .. } => "enum_option",
            Element::Entity { .. } => "entity",
            Element::Opaque { .. } => "opaque",
        }
    }
}

/// Relationship role as defined by the upstream
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkRole {
    pub id: String,
    /// Name seen from the origin of the link ("blocks")
    pub name: String,
    /// Name seen from the target of the link ("is blocked by")
    pub opposite_name: String,
}

impl LinkRole {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        opposite_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            opposite_name: opposite_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_wire_shape() {
        let value = FieldValue::enum_id("open");
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"type": "enum", "value": {"id": "open"}})
        );
        let null: FieldValue = serde_json::from_value(json!({"type": "null"})).unwrap();
        assert!(null.is_null());
    }

    #[test]
    fn test_element_discriminant_round_trips() {
        let role = LinkRole::new("blocks", "blocks", "is blocked by");
        let element = Element::relationship("WI-2", &role);
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["kind"], "relationship");
        assert_eq!(serde_json::from_value::<Element>(value).unwrap(), element);
    }

    #[test]
    fn test_null_reads_as_empty_list() {
        assert_eq!(FieldValue::Null.as_elements(), Some(&[][..]));
        assert!(FieldValue::text("x").as_elements().is_none());
    }
}
