//! Seed digest canonicalization
//!
//! Computes stable SHA-256 digests of seeds so re-imports can be correlated

use crate::errors::Result;
use crate::seed::format_v0::{SeedItem, SeedV0};
use revfeed_core::errors::{ExError, ExErrorKind};
use revfeed_core::model::FieldValue;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct CanonicalSeed<'a> {
    schema_version: u32,
    project: &'a str,
    containers: Vec<(&'a str, &'a str, &'a str)>,
    link_roles: Vec<(&'a str, &'a str, &'a str)>,
    items: Vec<CanonicalItem<'a>>,
}

#[derive(Debug, Serialize)]
struct CanonicalItem<'a> {
    id: &'a str,
    container: &'a str,
    item_type: &'a str,
    removed: bool,
    last_revision: Option<u64>,
    snapshots: Vec<CanonicalSnapshot<'a>>,
}

#[derive(Debug, Serialize)]
struct CanonicalSnapshot<'a> {
    revision: u64,
    fields: BTreeMap<&'a str, FieldValue>,
    custom_fields: BTreeMap<&'a str, FieldValue>,
    links: Vec<(&'a str, &'a str)>,
}

/// Compute a stable digest for a seed
///
/// Declaration order of containers, roles, items and links does not affect
/// the digest, nor does writing a value in plain or tagged form.
pub fn compute_seed_digest(seed: &SeedV0) -> Result<String> {
    let canonical = canonicalize_seed(seed);
    let json = serde_json::to_vec(&canonical).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("seed_digest")
            .with_message(e.to_string())
    })?;
    Ok(hex::encode(Sha256::digest(&json)))
}

fn canonicalize_seed(seed: &SeedV0) -> CanonicalSeed<'_> {
    let mut containers: Vec<_> = seed
        .containers
        .iter()
        .map(|c| (c.id.as_str(), c.space.as_str(), c.document.as_str()))
        .collect();
    containers.sort();

    let mut link_roles: Vec<_> = seed
        .link_roles
        .iter()
        .map(|r| (r.id.as_str(), r.name.as_str(), r.opposite_name.as_str()))
        .collect();
    link_roles.sort();

    let mut items: Vec<_> = seed.items.iter().map(canonicalize_item).collect();
    items.sort_by(|a, b| a.id.cmp(b.id));

    CanonicalSeed {
        schema_version: seed.schema_version,
        project: &seed.project.id,
        containers,
        link_roles,
        items,
    }
}

fn canonicalize_item(item: &SeedItem) -> CanonicalItem<'_> {
    let snapshots = item
        .snapshots
        .iter()
        .map(|s| {
            let mut links: Vec<_> = s
                .links
                .iter()
                .map(|l| (l.target.as_str(), l.role.as_str()))
                .collect();
            links.sort();
            CanonicalSnapshot {
                revision: s.revision,
                fields: s
                    .fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.to_field_value()))
                    .collect(),
                custom_fields: s
                    .custom_fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.to_field_value()))
                    .collect(),
                links,
            }
        })
        .collect();

    CanonicalItem {
        id: &item.id,
        container: &item.container,
        item_type: &item.item_type,
        removed: item.removed,
        last_revision: item.effective_last_revision(),
        snapshots,
    }
}
