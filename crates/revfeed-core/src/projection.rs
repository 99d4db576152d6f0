//! Resolved item state
//!
//! Projects the snapshot a walk ended on into the stringified
//! [`ItemState`] and the outgoing [`LinkedItem`]s the feed reports.

use crate::classify::RoleFilter;
use crate::model::{FieldValue, ItemState, LinkedItem, RoleTable, Snapshot, StateValue};
use crate::stringify::{element_tokens, stringify};
use std::collections::BTreeMap;

/// Projected state plus current outgoing links
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub state: ItemState,
    pub linked_items: Vec<LinkedItem>,
}

/// Project `snapshot`
///
/// Custom fields appear only when named in `custom_fields`. Links appear
/// only for roles admitted by `roles`; each one's role is recorded in
/// `role_table`.
pub fn project(
    snapshot: &Snapshot,
    custom_fields: &[String],
    roles: &RoleFilter,
    role_table: &mut RoleTable,
) -> Projection {
    let fields = snapshot
        .fields
        .iter()
        .map(|(name, value)| (name.clone(), state_value(value)))
        .collect();

    let custom: BTreeMap<String, StateValue> = custom_fields
        .iter()
        .filter_map(|name| {
            snapshot
                .custom_fields
                .get(name)
                .map(|value| (name.clone(), state_value(value)))
        })
        .collect();

    let mut linked_items = Vec::new();
    for link in &snapshot.links {
        if !roles.allows(&link.role.id) {
            continue;
        }
        role_table.record(&link.role);
        linked_items.push(LinkedItem::outgoing(link.target_id.clone(), &link.role));
    }

    Projection {
        state: ItemState {
            uri: snapshot.uri.clone(),
            item_type: snapshot.item_type.clone(),
            fields,
            custom_fields: custom,
        },
        linked_items,
    }
}

fn state_value(value: &FieldValue) -> StateValue {
    match value {
        FieldValue::List(elements) => StateValue::List(element_tokens(elements)),
        other => StateValue::Text(stringify(other)),
    }
}
