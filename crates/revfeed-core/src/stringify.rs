//! Fixed type-to-string convention for field values
//!
//! Scalar diffs and projected states both go through [`stringify`], so a
//! consumer sees the same text for a value whether it arrived as a change or
//! as part of the resolved state.

use crate::model::{Element, FieldValue};
use chrono::SecondsFormat;

/// Render a field value as the text the feed reports
pub fn stringify(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Float(n) => n.to_string(),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::Date(instant) => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        FieldValue::Duration(text) => text.clone(),
        FieldValue::Enum { id } | FieldValue::User { id } => id.clone(),
        FieldValue::Location { path } => path.clone(),
        FieldValue::List(elements) => element_tokens(elements).join(","),
    }
}

/// Stable token for a collection element, if it has one
///
/// Relationships render as their target id. Opaque payloads and entities
/// without an id have no token.
pub fn element_token(element: &Element) -> Option<String> {
    match element {
        Element::Hyperlink { uri, .. } => Some(uri.clone()),
        Element::Relationship { target_id, .. } => Some(target_id.clone()),
        Element::Approval { user_id, .. } => Some(user_id.clone()),
        Element::EnumOption { id } => Some(id.clone()),
        Element::Entity { id, .. } => id.clone(),
        Element::Opaque { .. } => None,
    }
}

/// Tokens of every element that has one, in input order
pub fn element_tokens(elements: &[Element]) -> Vec<String> {
    elements.iter().filter_map(element_token).collect()
}
