//! Collaborator contract consumed by the engine
//!
//! The engine never talks to the system of record directly. It reads the
//! catalog (containers, candidate items, membership, latest revision, link
//! roles) through [`Catalog`] and per-item histories and diffs through
//! [`SnapshotSource`]. Anything implementing both is an [`Upstream`].
//!
//! [`InMemoryUpstream`] is a complete implementation backed by plain
//! collections. The SQLite adapter lives in `revfeed-store`.

pub mod memory;

use crate::errors::Result;
use crate::model::{FieldDiff, LinkRole, Revision, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use memory::{InMemoryUpstream, InMemoryUpstreamBuilder};

/// Path segments naming one container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerPath {
    pub project: String,
    pub space: String,
    pub document: String,
}

impl ContainerPath {
    pub fn new(
        project: impl Into<String>,
        space: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            space: space.into(),
            document: document.into(),
        }
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.space, self.document)
    }
}

/// A container the catalog resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub path: ContainerPath,
}

/// Candidate item as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: String,
    pub item_type: String,
    /// Revision of the item's most recent change
    pub last_revision: Revision,
}

/// Per-item history and diff primitives
pub trait SnapshotSource {
    /// Snapshots of `item`, strictly ascending by revision
    ///
    /// An empty list means the item does not support history retrieval.
    ///
    /// # Errors
    ///
    /// Propagates upstream failures, including permission denials.
    fn snapshot_history(&self, item: &CatalogItem) -> Result<Vec<Snapshot>>;

    /// Field differences between two snapshots of the same item
    ///
    /// # Errors
    ///
    /// Propagates upstream failures.
    fn generate_field_diff(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        ignored_fields: &BTreeSet<String>,
    ) -> Result<Vec<FieldDiff>>;
}

/// Catalog queries over containers and their items
pub trait Catalog {
    /// # Errors
    ///
    /// Returns `FeedError::UnresolvableContainer` when the path names no container.
    fn resolve_container(&self, path: &ContainerPath) -> Result<ContainerRef>;

    /// Items recorded against `container`, including removed ones, filtered
    /// by type (empty `types` means all types) and ordered deterministically
    ///
    /// # Errors
    ///
    /// Propagates upstream failures.
    fn list_items(&self, container: &ContainerRef, types: &[String]) -> Result<Vec<CatalogItem>>;

    /// # Errors
    ///
    /// Propagates upstream failures.
    fn is_member_of_container(&self, item: &CatalogItem, container: &ContainerRef)
        -> Result<bool>;

    /// # Errors
    ///
    /// Propagates upstream failures.
    fn latest_known_revision(&self) -> Result<Revision>;

    /// Every link role the upstream defines
    ///
    /// # Errors
    ///
    /// Propagates upstream failures.
    fn link_roles(&self) -> Result<Vec<LinkRole>>;
}

/// Full collaborator surface the engine runs against
pub trait Upstream: Catalog + SnapshotSource {}

impl<T: Catalog + SnapshotSource> Upstream for T {}

/// Opens an upstream handle for one request
///
/// Each request gets its own handle, so implementations holding
/// non-shareable resources (a database connection) can open them here.
pub trait UpstreamProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `FeedError::Upstream` when the handle cannot be opened.
    fn open(&self) -> Result<Box<dyn Upstream>>;
}
