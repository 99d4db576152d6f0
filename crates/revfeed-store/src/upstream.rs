//! SQLite-backed upstream
//!
//! Serves the catalog and snapshot histories written by the seed importer.
//! Field diffs are computed with the reference diff engine from revfeed-core.

use crate::errors::{corrupt_snapshot, upstream_failure};
use crate::seed::importer::LATEST_REVISION_KEY;
use revfeed_core::diff::generate_field_diff;
use revfeed_core::errors::{FeedError, Result};
use revfeed_core::model::{FieldDiff, LinkRole, Revision, Snapshot};
use revfeed_core::upstream::{
    Catalog, CatalogItem, ContainerPath, ContainerRef, SnapshotSource, Upstream, UpstreamProvider,
};
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Upstream reading one open connection
pub struct SqliteUpstream {
    conn: Connection,
}

impl SqliteUpstream {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Catalog for SqliteUpstream {
    fn resolve_container(&self, path: &ContainerPath) -> Result<ContainerRef> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM containers WHERE project_id = ?1 AND space = ?2 AND document = ?3",
                [&path.project, &path.space, &path.document],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| upstream_failure("resolve_container", e))?;

        id.map(|id| ContainerRef {
            id,
            path: path.clone(),
        })
        .ok_or_else(|| FeedError::UnresolvableContainer {
            path: path.to_string(),
        })
    }

    fn list_items(&self, container: &ContainerRef, types: &[String]) -> Result<Vec<CatalogItem>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, item_type, last_revision FROM items
                 WHERE container_id = ?1 ORDER BY id",
            )
            .map_err(|e| upstream_failure("list_items", e))?;

        let items = stmt
            .query_map([&container.id], |row| {
                Ok(CatalogItem {
                    id: row.get(0)?,
                    item_type: row.get(1)?,
                    last_revision: Revision::new(row.get(2)?),
                })
            })
            .map_err(|e| upstream_failure("list_items", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| upstream_failure("list_items", e))?;

        Ok(items
            .into_iter()
            .filter(|item| types.is_empty() || types.contains(&item.item_type))
            .collect())
    }

    fn is_member_of_container(
        &self,
        item: &CatalogItem,
        container: &ContainerRef,
    ) -> Result<bool> {
        let row: Option<(String, bool)> = self
            .conn
            .query_row(
                "SELECT container_id, removed FROM items WHERE id = ?1",
                [&item.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| upstream_failure("is_member_of_container", e))?;

        Ok(matches!(row, Some((container_id, false)) if container_id == container.id))
    }

    fn latest_known_revision(&self) -> Result<Revision> {
        let latest: Option<u64> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [LATEST_REVISION_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| upstream_failure("latest_known_revision", e))?;
        Ok(Revision::new(latest.unwrap_or(0)))
    }

    fn link_roles(&self) -> Result<Vec<LinkRole>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, opposite_name FROM link_roles ORDER BY id")
            .map_err(|e| upstream_failure("link_roles", e))?;
        let roles = stmt
            .query_map([], |row| {
                Ok(LinkRole::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| upstream_failure("link_roles", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| upstream_failure("link_roles", e))?;
        Ok(roles)
    }
}

impl SnapshotSource for SqliteUpstream {
    fn snapshot_history(&self, item: &CatalogItem) -> Result<Vec<Snapshot>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM snapshots WHERE item_id = ?1 ORDER BY revision")
            .map_err(|e| upstream_failure("snapshot_history", e))?;
        let bodies = stmt
            .query_map([&item.id], |row| row.get::<_, String>(0))
            .map_err(|e| upstream_failure("snapshot_history", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| upstream_failure("snapshot_history", e))?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(|e| corrupt_snapshot(&item.id, e)))
            .collect()
    }

    fn generate_field_diff(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        ignored_fields: &BTreeSet<String>,
    ) -> Result<Vec<FieldDiff>> {
        Ok(generate_field_diff(before, after, ignored_fields))
    }
}

/// Opens a fresh connection to the database at `path` for every request
#[derive(Debug, Clone)]
pub struct SqliteUpstreamProvider {
    path: PathBuf,
}

impl SqliteUpstreamProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UpstreamProvider for SqliteUpstreamProvider {
    fn open(&self) -> Result<Box<dyn Upstream>> {
        let conn = crate::db::open(&self.path)
            .and_then(|conn| crate::db::configure(&conn).map(|()| conn))
            .map_err(|e| FeedError::Upstream {
                op: "open_upstream".to_string(),
                message: e.to_string(),
            })?;
        Ok(Box::new(SqliteUpstream::new(conn)))
    }
}
