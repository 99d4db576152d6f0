//! Batch orchestration for one request
//!
//! A [`FeedSession`] owns every piece of per-request mutable state: the
//! result map, the pending reverse links, the role table and the current-id
//! accumulator. It is built for one request and consumed by [`FeedSession::run`].
//!
//! ## Budget
//!
//! The time budget is checked before each item, never inside one. Once the
//! elapsed time exceeds the budget the batch turns PARTIAL, the triggering
//! item is left unprocessed and the current-id accumulator is dropped.

use crate::clock::Clock;
use revfeed_core::backlinks::{synthesize_current_links, BacklinkRegistry};
use revfeed_core::classify::RoleFilter;
use revfeed_core::errors::{FeedError, Result};
use revfeed_core::model::{ChangeRecord, ItemChangeSet, ResponseType, RoleTable, Snapshot};
use revfeed_core::projection::project;
use revfeed_core::upstream::{CatalogItem, ContainerRef, Upstream};
use revfeed_core::walker::DiffWalker;
use revfeed_core::window::{locate_start, RevisionWindow};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Request-level options the session applies to every item
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub roles: RoleFilter,
    pub custom_fields: Vec<String>,
    pub known_item_ids: BTreeSet<String>,
    pub ignored_fields: BTreeSet<String>,
    pub time_budget: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    AssumedComplete,
    Partial,
}

/// What a finished batch hands to the response assembler
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Reported items keyed by id
    pub results: BTreeMap<String, ItemChangeSet>,
    /// Ids of every member item; `None` when the batch is partial
    pub current_ids: Option<Vec<String>>,
    pub response_type: ResponseType,
    /// Items looked at before the batch ended
    pub processed: usize,
}

/// Per-request orchestrator
pub struct FeedSession<'a> {
    upstream: &'a dyn Upstream,
    clock: &'a dyn Clock,
    container: &'a ContainerRef,
    window: RevisionWindow,
    options: SessionOptions,
    backlinks: BacklinkRegistry,
    role_table: RoleTable,
    results: BTreeMap<String, ItemChangeSet>,
    current_ids: Vec<String>,
    state: BatchState,
}

impl<'a> FeedSession<'a> {
    pub fn new(
        upstream: &'a dyn Upstream,
        clock: &'a dyn Clock,
        container: &'a ContainerRef,
        window: RevisionWindow,
        options: SessionOptions,
    ) -> Self {
        Self {
            upstream,
            clock,
            container,
            window,
            options,
            backlinks: BacklinkRegistry::new(),
            role_table: RoleTable::new(),
            results: BTreeMap::new(),
            current_ids: Vec::new(),
            state: BatchState::AssumedComplete,
        }
    }

    /// Process `items` in order, then synthesize the opposite end of links
    ///
    /// # Errors
    ///
    /// Any upstream failure aborts the batch, as does an empty history
    /// (`FeedError::HistoryRetrievalInconsistency`).
    pub fn run(mut self, items: &[CatalogItem]) -> Result<BatchOutcome> {
        let started = self.clock.now();
        let mut processed = 0;

        for item in items {
            let elapsed = self.clock.now().saturating_duration_since(started);
            if elapsed > self.options.time_budget {
                tracing::info!(
                    processed,
                    candidates = items.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "time budget exhausted, returning partial batch"
                );
                self.state = BatchState::Partial;
                break;
            }
            self.process_item(item)?;
            processed += 1;
        }

        let merged = self.backlinks.merge_changes(&mut self.results);
        let mirrored = synthesize_current_links(&mut self.results, &self.role_table);
        tracing::debug!(merged, mirrored, "reverse links synthesized");

        let (response_type, current_ids) = match self.state {
            BatchState::AssumedComplete => (ResponseType::Complete, Some(self.current_ids)),
            BatchState::Partial => (ResponseType::Partial, None),
        };

        Ok(BatchOutcome {
            results: self.results,
            current_ids,
            response_type,
            processed,
        })
    }

    fn process_item(&mut self, item: &CatalogItem) -> Result<()> {
        if !self.upstream.is_member_of_container(item, self.container)? {
            if self.window.contains(item.last_revision) {
                tracing::debug!(item_id = %item.id, revision = %item.last_revision, "removed from container");
                self.results.insert(
                    item.id.clone(),
                    ItemChangeSet::deleted(item.id.clone(), item.last_revision),
                );
            }
            return Ok(());
        }

        self.current_ids.push(item.id.clone());

        if item.last_revision <= self.window.baseline() {
            tracing::debug!(item_id = %item.id, "unchanged since baseline");
            return Ok(());
        }
        if self.options.known_item_ids.contains(&item.id) {
            tracing::debug!(item_id = %item.id, "held in sync by caller");
            return Ok(());
        }

        let history = self.upstream.snapshot_history(item)?;
        match history.as_slice() {
            [] => Err(FeedError::HistoryRetrievalInconsistency {
                item_id: item.id.clone(),
            }),
            [created] => {
                if self.window.contains(created.revision) {
                    self.record(created, Vec::new());
                }
                Ok(())
            }
            _ => {
                let Some(start) = locate_start(&history, &self.window) else {
                    tracing::debug!(item_id = %item.id, "history outside window");
                    return Ok(());
                };
                let walker = DiffWalker::new(
                    self.upstream,
                    &self.options.roles,
                    &self.options.ignored_fields,
                );
                let outcome = walker.walk(&history, start, &self.window, &mut self.backlinks)?;

                let resolved = &history[outcome.end_index];
                // baseline 0 starts at the first snapshot even when it lies past the end
                if resolved.revision > self.window.end() {
                    return Ok(());
                }
                self.record(resolved, outcome.records);
                Ok(())
            }
        }
    }

    fn record(&mut self, resolved: &Snapshot, records: Vec<ChangeRecord>) {
        let projection = project(
            resolved,
            &self.options.custom_fields,
            &self.options.roles,
            &mut self.role_table,
        );
        self.results.insert(
            resolved.item_id.clone(),
            ItemChangeSet::updated(
                resolved.item_id.clone(),
                resolved.revision,
                projection.state,
                projection.linked_items,
                records,
            ),
        );
    }
}
