//! Seed importer orchestration
//!
//! Writes a validated seed into SQLite in a single transaction. Items are
//! upserted by id and their snapshot history is replaced wholesale, so
//! importing the same seed twice leaves the database unchanged.

use crate::errors::{from_rusqlite, Result};
use crate::seed::format_v0::{SeedItem, SeedSnapshot, SeedV0};
use crate::seed::parser::{parse_seed_file_with_db, parse_seed_str_with_db};
use crate::seed::{compute_seed_digest, provenance};
use revfeed_core::errors::{ExError, ExErrorKind};
use revfeed_core::model::{LinkRole, Revision, Snapshot};
use revfeed_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// Key under which the highest imported revision is kept in `meta`
pub const LATEST_REVISION_KEY: &str = "latest_revision";

/// What one import wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// SHA-256 of the canonical seed
    pub digest: String,
    pub containers: usize,
    pub items: usize,
    pub snapshots: usize,
    /// `meta.latest_revision` after the import
    pub latest_revision: Revision,
}

/// Import a seed file into the database
///
/// 1. Parses and validates the seed (references may resolve against earlier imports)
/// 2. Computes the seed digest
/// 3. Upserts project, containers, link roles and items, replacing histories
/// 4. Raises `meta.latest_revision` to the highest revision seen
/// 5. Records provenance events under the digest
pub fn import_seed(path: &Path, conn: &mut Connection) -> Result<ImportSummary> {
    log_op_start!("seed_import", path = %path.display());
    let start = Instant::now();

    let result =
        parse_seed_file_with_db(path, Some(&*conn)).and_then(|seed| write_seed(&seed, conn));
    finish(result, start)
}

/// Import seed YAML held in memory
pub fn import_seed_str(content: &str, conn: &mut Connection) -> Result<ImportSummary> {
    log_op_start!("seed_import");
    let start = Instant::now();

    let result =
        parse_seed_str_with_db(content, Some(&*conn)).and_then(|seed| write_seed(&seed, conn));
    finish(result, start)
}

fn finish(result: Result<ImportSummary>, start: Instant) -> Result<ImportSummary> {
    match result {
        Ok(summary) => {
            log_op_end!(
                "seed_import",
                duration_ms = start.elapsed().as_millis() as u64,
                items = summary.items as u64,
                latest_revision = summary.latest_revision.get()
            );
            Ok(summary)
        }
        Err(err) => {
            log_op_error!(
                "seed_import",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

fn write_seed(seed: &SeedV0, conn: &mut Connection) -> Result<ImportSummary> {
    let digest = compute_seed_digest(seed)?;
    let tx = conn.transaction().map_err(from_rusqlite)?;

    provenance::emit_started(&tx, &digest, &seed.project.id)?;

    tx.execute(
        "INSERT OR IGNORE INTO projects (id) VALUES (?1)",
        [&seed.project.id],
    )
    .map_err(from_rusqlite)?;

    for container in &seed.containers {
        tx.execute(
            "INSERT INTO containers (id, project_id, space, document) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                space = excluded.space,
                document = excluded.document",
            params![container.id, seed.project.id, container.space, container.document],
        )
        .map_err(from_rusqlite)?;
    }

    for role in &seed.link_roles {
        tx.execute(
            "INSERT INTO link_roles (id, name, opposite_name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                opposite_name = excluded.opposite_name",
            params![role.id, role.name, role.opposite_name],
        )
        .map_err(from_rusqlite)?;
    }

    let roles = load_roles(&tx)?;
    let mut snapshots = 0;
    let mut highest = Revision::ZERO;

    for item in &seed.items {
        let prefix = item_uri_prefix(&tx, &item.container)?;
        snapshots += write_item(&tx, item, &prefix, &roles)?;
        if let Some(last) = item.effective_last_revision() {
            highest = highest.max(Revision::new(last));
        }
        provenance::emit_applied(&tx, &digest, &item.id)?;
    }

    let latest_revision = raise_latest_revision(&tx, highest)?;
    provenance::emit_completed(&tx, &digest, seed.items.len())?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(ImportSummary {
        digest,
        containers: seed.containers.len(),
        items: seed.items.len(),
        snapshots,
        latest_revision,
    })
}

fn write_item(
    tx: &Transaction,
    item: &SeedItem,
    uri_prefix: &str,
    roles: &BTreeMap<String, LinkRole>,
) -> Result<usize> {
    let last_revision = item.effective_last_revision().unwrap_or_default();

    tx.execute(
        "INSERT INTO items (id, container_id, item_type, last_revision, removed)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            container_id = excluded.container_id,
            item_type = excluded.item_type,
            last_revision = excluded.last_revision,
            removed = excluded.removed",
        params![item.id, item.container, item.item_type, last_revision, item.removed],
    )
    .map_err(from_rusqlite)?;

    tx.execute("DELETE FROM snapshots WHERE item_id = ?1", [&item.id])
        .map_err(from_rusqlite)?;

    let uri = format!("{}/{}", uri_prefix, item.id);
    for seed_snapshot in &item.snapshots {
        let snapshot = to_snapshot(item, seed_snapshot, &uri, roles)?;
        let body = serde_json::to_string(&snapshot).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("seed_import")
                .with_item_id(item.id.clone())
                .with_message(e.to_string())
        })?;
        tx.execute(
            "INSERT INTO snapshots (item_id, revision, body) VALUES (?1, ?2, ?3)",
            params![item.id, seed_snapshot.revision, body],
        )
        .map_err(from_rusqlite)?;
    }

    Ok(item.snapshots.len())
}

fn to_snapshot(
    item: &SeedItem,
    seed_snapshot: &SeedSnapshot,
    uri: &str,
    roles: &BTreeMap<String, LinkRole>,
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new(item.id.clone(), Revision::new(seed_snapshot.revision))
        .with_type(item.item_type.clone());
    snapshot.uri = uri.to_string();

    for (name, value) in &seed_snapshot.fields {
        snapshot = snapshot.with_field(name.clone(), value.to_field_value());
    }
    for (name, value) in &seed_snapshot.custom_fields {
        snapshot = snapshot.with_custom_field(name.clone(), value.to_field_value());
    }
    for link in &seed_snapshot.links {
        // validated by the parser; a miss here means the role row vanished mid-transaction
        let role = roles.get(&link.role).ok_or_else(|| {
            ExError::new(ExErrorKind::ConstraintViolation)
                .with_op("seed_import")
                .with_item_id(item.id.clone())
                .with_message(format!("link role {} not found", link.role))
        })?;
        snapshot = snapshot.with_link(link.target.clone(), role);
    }

    Ok(snapshot)
}

fn load_roles(tx: &Transaction) -> Result<BTreeMap<String, LinkRole>> {
    let mut stmt = tx
        .prepare("SELECT id, name, opposite_name FROM link_roles")
        .map_err(from_rusqlite)?;
    let roles = stmt
        .query_map([], |row| {
            Ok(LinkRole::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(from_rusqlite)?
        .map(|role| role.map(|r| (r.id.clone(), r)))
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()
        .map_err(from_rusqlite)?;
    Ok(roles)
}

fn item_uri_prefix(tx: &Transaction, container_id: &str) -> Result<String> {
    tx.query_row(
        "SELECT project_id, space, document FROM containers WHERE id = ?1",
        [container_id],
        |row| {
            Ok(format!(
                "{}/{}/{}",
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?
            ))
        },
    )
    .map_err(from_rusqlite)
}

fn raise_latest_revision(tx: &Transaction, candidate: Revision) -> Result<Revision> {
    let current: Option<u64> = tx
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            [LATEST_REVISION_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    let latest = Revision::new(current.unwrap_or(0)).max(candidate);
    tx.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![LATEST_REVISION_KEY, latest.get()],
    )
    .map_err(from_rusqlite)?;
    Ok(latest)
}
