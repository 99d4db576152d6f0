//! Response assembly

use crate::session::BatchOutcome;
use revfeed_core::model::{ResponseEnvelope, Revision};
use revfeed_core::window::RevisionWindow;

/// Build the envelope for a finished batch
///
/// Items come out ordered by id. `to_revision` is the window end clamped to
/// the latest revision the upstream knows about.
pub fn assemble(outcome: BatchOutcome, window: &RevisionWindow, latest: Revision) -> ResponseEnvelope {
    let all_item_ids = outcome.current_ids.map(|mut ids| {
        ids.sort();
        ids.dedup();
        ids
    });

    ResponseEnvelope {
        items: outcome.results.into_values().collect(),
        all_item_ids,
        response_type: outcome.response_type,
        from_revision: window.baseline().next(),
        to_revision: window.end().min(latest),
    }
}
