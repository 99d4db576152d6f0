//! Diff walk over one item's history
//!
//! Starting at the index picked by [`locate_start`](crate::window::locate_start),
//! the walker diffs each adjacent pair up to the window end and turns the
//! upstream's field diffs into [`ChangeRecord`]s.

use crate::backlinks::BacklinkRegistry;
use crate::classify::{classify_collection, ClassifyContext, RoleFilter};
use crate::errors::Result;
use crate::model::{ChangeRecord, FieldChange, FieldDiff, Snapshot};
use crate::stringify::stringify;
use crate::upstream::SnapshotSource;
use crate::window::RevisionWindow;
use std::collections::BTreeSet;

/// Records produced by one walk, and the index of the snapshot it stopped at
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    pub records: Vec<ChangeRecord>,
    /// Last visited index; its snapshot is the resolved state
    pub end_index: usize,
}

/// Walks histories against one diff source with fixed request options
pub struct DiffWalker<'a, S: ?Sized> {
    source: &'a S,
    roles: &'a RoleFilter,
    ignored_fields: &'a BTreeSet<String>,
}

impl<'a, S: SnapshotSource + ?Sized> DiffWalker<'a, S> {
    pub fn new(
        source: &'a S,
        roles: &'a RoleFilter,
        ignored_fields: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            source,
            roles,
            ignored_fields,
        }
    }

    /// Diff `history[start..]` pairwise while the next revision is within
    /// `window.end()`
    ///
    /// Pairs ending at or before the baseline are skipped without a diff
    /// call. Every pair the source reports a difference for yields a
    /// record, even when classification filters all of it out.
    ///
    /// # Errors
    ///
    /// Propagates diff source failures.
    pub fn walk(
        &self,
        history: &[Snapshot],
        start: usize,
        window: &RevisionWindow,
        backlinks: &mut BacklinkRegistry,
    ) -> Result<WalkOutcome> {
        let mut records = Vec::new();
        let mut index = start;

        while let Some(next) = history.get(index + 1) {
            if next.revision > window.end() {
                break;
            }
            if next.revision > window.baseline() {
                let diffs =
                    self.source
                        .generate_field_diff(&history[index], next, self.ignored_fields)?;
                if !diffs.is_empty() {
                    records.push(ChangeRecord {
                        revision: next.revision,
                        field_changes: self.to_changes(next, &diffs, backlinks),
                    });
                }
            }
            index += 1;
        }

        Ok(WalkOutcome {
            records,
            end_index: index,
        })
    }

    fn to_changes(
        &self,
        snapshot: &Snapshot,
        diffs: &[FieldDiff],
        backlinks: &mut BacklinkRegistry,
    ) -> Vec<FieldChange> {
        let mut ctx = ClassifyContext {
            item_id: &snapshot.item_id,
            revision: snapshot.revision,
            roles: self.roles,
            backlinks,
        };

        let mut changes = Vec::new();
        for diff in diffs {
            match diff {
                FieldDiff::Scalar {
                    field,
                    before,
                    after,
                } => changes.push(FieldChange::Scalar {
                    field_name: field.clone(),
                    before: stringify(before),
                    after: stringify(after),
                }),
                FieldDiff::Collection {
                    field,
                    added,
                    removed,
                } => changes.extend(classify_collection(field, added, removed, &mut ctx)),
            }
        }
        changes
    }
}
