//! Provenance event tracking for seed imports
//!
//! Records events in the provenance_events table, correlated by seed digest

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// Provenance event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceKind {
    ImportStarted,
    ItemApplied,
    ImportCompleted,
}

impl ProvenanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceKind::ImportStarted => "seed_import_started",
            ProvenanceKind::ItemApplied => "seed_item_applied",
            ProvenanceKind::ImportCompleted => "seed_import_completed",
        }
    }
}

/// Emit a provenance event
///
/// Accepts a plain connection or a transaction (which derefs to one).
pub fn emit_event(
    conn: &Connection,
    kind: ProvenanceKind,
    correlation_id: &str,
    metadata: serde_json::Value,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO provenance_events (kind, correlation_id, timestamp, metadata) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![kind.as_str(), correlation_id, now, metadata.to_string()],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

pub fn emit_started(conn: &Connection, seed_digest: &str, project: &str) -> Result<()> {
    emit_event(
        conn,
        ProvenanceKind::ImportStarted,
        seed_digest,
        serde_json::json!({ "seed_digest": seed_digest, "project": project }),
    )
}

pub fn emit_applied(conn: &Connection, seed_digest: &str, item_id: &str) -> Result<()> {
    emit_event(
        conn,
        ProvenanceKind::ItemApplied,
        seed_digest,
        serde_json::json!({ "item_id": item_id }),
    )
}

pub fn emit_completed(conn: &Connection, seed_digest: &str, items: usize) -> Result<()> {
    emit_event(
        conn,
        ProvenanceKind::ImportCompleted,
        seed_digest,
        serde_json::json!({ "seed_digest": seed_digest, "items": items }),
    )
}

/// Kinds recorded for `correlation_id`, oldest first
pub fn events_for(conn: &Connection, correlation_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT kind FROM provenance_events WHERE correlation_id = ?1 ORDER BY id")
        .map_err(from_rusqlite)?;
    let kinds = stmt
        .query_map([correlation_id], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(kinds)
}
