//! In-memory upstream
//!
//! Backs the engine with plain collections. Used by tests and by tooling
//! that needs a feed without a database. Cloning is cheap: the data sits
//! behind an `Arc` and is frozen once built.

use super::{Catalog, CatalogItem, ContainerPath, ContainerRef, SnapshotSource, Upstream, UpstreamProvider};
use crate::diff::generate_field_diff;
use crate::errors::{FeedError, Result};
use crate::model::{FieldDiff, LinkRole, Revision, Snapshot};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StoredItem {
    container_id: String,
    item_type: String,
    last_revision: Revision,
    removed: bool,
    history: Vec<Snapshot>,
}

#[derive(Debug, Default)]
struct Data {
    containers: Vec<ContainerRef>,
    items: BTreeMap<String, StoredItem>,
    link_roles: Vec<LinkRole>,
    diff_overrides: BTreeMap<(String, Revision), Vec<FieldDiff>>,
    denied_history: BTreeSet<String>,
    latest_revision: Option<Revision>,
}

/// Upstream backed by in-memory collections
#[derive(Debug, Clone)]
pub struct InMemoryUpstream {
    data: Arc<Data>,
    diff_calls: Arc<AtomicUsize>,
    history_calls: Arc<AtomicUsize>,
}

impl InMemoryUpstream {
    pub fn builder() -> InMemoryUpstreamBuilder {
        InMemoryUpstreamBuilder::default()
    }

    /// Number of `generate_field_diff` calls served so far, across clones
    pub fn diff_calls(&self) -> usize {
        self.diff_calls.load(Ordering::SeqCst)
    }

    /// Number of `snapshot_history` calls served so far, across clones
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn stored(&self, id: &str) -> Result<&StoredItem> {
        self.data.items.get(id).ok_or_else(|| FeedError::Upstream {
            op: "lookup_item".to_string(),
            message: format!("unknown item '{}'", id),
        })
    }
}

impl Catalog for InMemoryUpstream {
    fn resolve_container(&self, path: &ContainerPath) -> Result<ContainerRef> {
        self.data
            .containers
            .iter()
            .find(|c| &c.path == path)
            .cloned()
            .ok_or_else(|| FeedError::UnresolvableContainer {
                path: path.to_string(),
            })
    }

    fn list_items(&self, container: &ContainerRef, types: &[String]) -> Result<Vec<CatalogItem>> {
        Ok(self
            .data
            .items
            .iter()
            .filter(|(_, item)| item.container_id == container.id)
            .filter(|(_, item)| types.is_empty() || types.contains(&item.item_type))
            .map(|(id, item)| CatalogItem {
                id: id.clone(),
                item_type: item.item_type.clone(),
                last_revision: item.last_revision,
            })
            .collect())
    }

    fn is_member_of_container(&self, item: &CatalogItem, container: &ContainerRef) -> Result<bool> {
        let stored = self.stored(&item.id)?;
        Ok(!stored.removed && stored.container_id == container.id)
    }

    fn latest_known_revision(&self) -> Result<Revision> {
        if let Some(latest) = self.data.latest_revision {
            return Ok(latest);
        }
        Ok(self
            .data
            .items
            .values()
            .map(|item| item.last_revision)
            .max()
            .unwrap_or(Revision::ZERO))
    }

    fn link_roles(&self) -> Result<Vec<LinkRole>> {
        Ok(self.data.link_roles.clone())
    }
}

impl SnapshotSource for InMemoryUpstream {
    fn snapshot_history(&self, item: &CatalogItem) -> Result<Vec<Snapshot>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.data.denied_history.contains(&item.id) {
            return Err(FeedError::PermissionDenied {
                message: format!("no read access to history of '{}'", item.id),
            });
        }
        Ok(self.stored(&item.id)?.history.clone())
    }

    fn generate_field_diff(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        ignored_fields: &BTreeSet<String>,
    ) -> Result<Vec<FieldDiff>> {
        self.diff_calls.fetch_add(1, Ordering::SeqCst);
        let key = (after.item_id.clone(), after.revision);
        if let Some(diffs) = self.data.diff_overrides.get(&key) {
            return Ok(diffs.clone());
        }
        Ok(generate_field_diff(before, after, ignored_fields))
    }
}

impl UpstreamProvider for InMemoryUpstream {
    fn open(&self) -> Result<Box<dyn Upstream>> {
        Ok(Box::new(self.clone()))
    }
}

/// Builder for [`InMemoryUpstream`]
#[derive(Debug, Default)]
pub struct InMemoryUpstreamBuilder {
    data: Data,
}

impl InMemoryUpstreamBuilder {
    /// Register a container; its id is the path rendered as `p/s/d`
    pub fn container(mut self, path: ContainerPath) -> Self {
        if !self.data.containers.iter().any(|c| c.path == path) {
            self.data.containers.push(ContainerRef {
                id: path.to_string(),
                path,
            });
        }
        self
    }

    pub fn link_role(mut self, role: LinkRole) -> Self {
        self.data.link_roles.push(role);
        self
    }

    /// Add a live item whose type and last revision come from its newest snapshot
    pub fn item(self, container: &ContainerPath, history: Vec<Snapshot>) -> Self {
        self.insert(container, history, false)
    }

    /// Add an item that has since been removed from `container`
    pub fn removed_item(self, container: &ContainerPath, history: Vec<Snapshot>) -> Self {
        self.insert(container, history, true)
    }

    /// Add an item whose history comes back empty
    pub fn item_without_history(
        mut self,
        container: &ContainerPath,
        id: impl Into<String>,
        item_type: impl Into<String>,
        last_revision: impl Into<Revision>,
    ) -> Self {
        self = self.container(container.clone());
        self.data.items.insert(
            id.into(),
            StoredItem {
                container_id: container.to_string(),
                item_type: item_type.into(),
                last_revision: last_revision.into(),
                removed: false,
                history: Vec::new(),
            },
        );
        self
    }

    /// Answer the diff ending at (`item_id`, `revision`) with `diffs` instead
    /// of computing it
    pub fn diff_override(
        mut self,
        item_id: impl Into<String>,
        revision: impl Into<Revision>,
        diffs: Vec<FieldDiff>,
    ) -> Self {
        self.data
            .diff_overrides
            .insert((item_id.into(), revision.into()), diffs);
        self
    }

    /// Fail history retrieval for `item_id` with a permission error
    pub fn deny_history(mut self, item_id: impl Into<String>) -> Self {
        self.data.denied_history.insert(item_id.into());
        self
    }

    /// Pin the latest known revision instead of deriving it from the items
    pub fn latest_revision(mut self, revision: impl Into<Revision>) -> Self {
        self.data.latest_revision = Some(revision.into());
        self
    }

    pub fn build(self) -> InMemoryUpstream {
        InMemoryUpstream {
            data: Arc::new(self.data),
            diff_calls: Arc::new(AtomicUsize::new(0)),
            history_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn insert(mut self, container: &ContainerPath, mut history: Vec<Snapshot>, removed: bool) -> Self {
        history.sort_by_key(|snapshot| snapshot.revision);
        let Some(newest) = history.last() else {
            return self;
        };
        let id = newest.item_id.clone();
        let item = StoredItem {
            container_id: container.to_string(),
            item_type: newest.item_type.clone(),
            last_revision: newest.revision,
            removed,
            history,
        };
        self = self.container(container.clone());
        self.data.items.insert(id, item);
        self
    }
}
