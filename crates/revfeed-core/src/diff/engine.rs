//! Field diff computation between two snapshots.

use crate::model::{Element, FieldDiff, FieldValue, Snapshot, SnapshotLink, LINKED_ITEMS_FIELD};
use std::collections::{BTreeMap, BTreeSet};

/// Compute the field differences from `before` to `after`.
///
/// Fields named in `ignored` are skipped. A field missing on one side is
/// compared against `Null`.
pub fn generate_field_diff(
    before: &Snapshot,
    after: &Snapshot,
    ignored: &BTreeSet<String>,
) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();
    diff_field_map(&before.fields, &after.fields, ignored, &mut diffs);
    diff_field_map(&before.custom_fields, &after.custom_fields, ignored, &mut diffs);

    if !ignored.contains(LINKED_ITEMS_FIELD) {
        if let Some(diff) = diff_links(&before.links, &after.links) {
            diffs.push(diff);
        }
    }
    diffs
}

fn diff_field_map(
    before: &BTreeMap<String, FieldValue>,
    after: &BTreeMap<String, FieldValue>,
    ignored: &BTreeSet<String>,
    out: &mut Vec<FieldDiff>,
) {
    let names: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let null = FieldValue::Null;

    for name in names {
        if ignored.contains(name.as_str()) {
            continue;
        }
        let a = before.get(name).unwrap_or(&null);
        let b = after.get(name).unwrap_or(&null);
        if a == b {
            continue;
        }

        let is_collection =
            matches!(a, FieldValue::List(_)) || matches!(b, FieldValue::List(_));
        match (is_collection, a.as_elements(), b.as_elements()) {
            (true, Some(a_elems), Some(b_elems)) => {
                let (added, removed) = set_delta(a_elems, b_elems);
                if !added.is_empty() || !removed.is_empty() {
                    out.push(FieldDiff::Collection {
                        field: name.clone(),
                        added,
                        removed,
                    });
                }
            }
            _ => out.push(FieldDiff::Scalar {
                field: name.clone(),
                before: a.clone(),
                after: b.clone(),
            }),
        }
    }
}

/// Elements present only in `b` (added) and only in `a` (removed)
fn set_delta(a: &[Element], b: &[Element]) -> (Vec<Element>, Vec<Element>) {
    let added = b.iter().filter(|e| !a.contains(e)).cloned().collect();
    let removed = a.iter().filter(|e| !b.contains(e)).cloned().collect();
    (added, removed)
}

fn diff_links(before: &[SnapshotLink], after: &[SnapshotLink]) -> Option<FieldDiff> {
    let same = |x: &SnapshotLink, y: &SnapshotLink| {
        x.target_id == y.target_id && x.role.id == y.role.id
    };
    let added: Vec<Element> = after
        .iter()
        .filter(|link| !before.iter().any(|b| same(b, link)))
        .map(SnapshotLink::to_element)
        .collect();
    let removed: Vec<Element> = before
        .iter()
        .filter(|link| !after.iter().any(|a| same(a, link)))
        .map(SnapshotLink::to_element)
        .collect();

    if added.is_empty() && removed.is_empty() {
        return None;
    }
    Some(FieldDiff::Collection {
        field: LINKED_ITEMS_FIELD.to_string(),
        added,
        removed,
    })
}
