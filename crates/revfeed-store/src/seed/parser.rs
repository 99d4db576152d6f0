//! Seed parser with validation
//!
//! Parses YAML and validates schema version, identifier uniqueness, revision
//! order and referential integrity. With a connection, references may also
//! resolve against containers and link roles imported by earlier seeds.

use crate::errors::{io_error, seed_validation, Result};
use crate::seed::format_v0::SeedV0;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    parse_seed_file_with_db(path, None)
}

/// Parse a seed file, resolving references against `conn` as well
pub fn parse_seed_file_with_db(path: &Path, conn: Option<&Connection>) -> Result<SeedV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("seed_read", e))?;
    parse_seed_str_with_db(&content, conn)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    parse_seed_str_with_db(content, None)
}

/// Parse a seed from a string, resolving references against `conn` as well
pub fn parse_seed_str_with_db(content: &str, conn: Option<&Connection>) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed, conn)?;

    Ok(seed)
}

fn validate_seed(seed: &SeedV0, conn: Option<&Connection>) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    let mut container_ids = HashSet::new();
    let mut paths = HashSet::new();
    for container in &seed.containers {
        if !container_ids.insert(container.id.as_str()) {
            return Err(seed_validation(&format!(
                "Duplicate container id {}",
                container.id
            )));
        }
        if !paths.insert((container.space.as_str(), container.document.as_str())) {
            return Err(seed_validation(&format!(
                "Duplicate container path {}/{}/{}",
                seed.project.id, container.space, container.document
            )));
        }
    }

    let mut role_ids = HashSet::new();
    for role in &seed.link_roles {
        if !role_ids.insert(role.id.as_str()) {
            return Err(seed_validation(&format!("Duplicate link role {}", role.id)));
        }
    }

    let mut item_ids = HashSet::new();
    for item in &seed.items {
        if !item_ids.insert(item.id.as_str()) {
            return Err(seed_validation(&format!("Duplicate item id {}", item.id)));
        }

        if !container_ids.contains(item.container.as_str())
            && !exists_in_db(conn, "SELECT 1 FROM containers WHERE id = ?1", &item.container)?
        {
            return Err(seed_validation(&format!(
                "Item {} references non-existent container {}",
                item.id, item.container
            )));
        }

        for pair in item.snapshots.windows(2) {
            if pair[1].revision <= pair[0].revision {
                return Err(seed_validation(&format!(
                    "Snapshots of item {} must strictly ascend: {} follows {}",
                    item.id, pair[1].revision, pair[0].revision
                )));
            }
        }

        match (item.last_revision, item.snapshots.last()) {
            (None, None) => {
                return Err(seed_validation(&format!(
                    "Item {} has no snapshots and no last_revision",
                    item.id
                )));
            }
            (Some(last), Some(snapshot)) if last < snapshot.revision => {
                return Err(seed_validation(&format!(
                    "Item {} declares last_revision {} before its snapshot {}",
                    item.id, last, snapshot.revision
                )));
            }
            _ => {}
        }

        for link in item.snapshots.iter().flat_map(|s| &s.links) {
            if !role_ids.contains(link.role.as_str())
                && !exists_in_db(conn, "SELECT 1 FROM link_roles WHERE id = ?1", &link.role)?
            {
                return Err(seed_validation(&format!(
                    "Item {} links with undefined role {}",
                    item.id, link.role
                )));
            }
        }
    }

    Ok(())
}

fn exists_in_db(conn: Option<&Connection>, sql: &str, id: &str) -> Result<bool> {
    let Some(conn) = conn else {
        return Ok(false);
    };
    let found = conn
        .query_row(sql, [id], |_| Ok(()))
        .optional()
        .map_err(crate::errors::from_rusqlite)?;
    Ok(found.is_some())
}
