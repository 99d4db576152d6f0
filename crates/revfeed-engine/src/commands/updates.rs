//! Updates query handler with boundary logging.
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for the feed query:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Core modules only emit `tracing::debug!()`/`warn!()` for per-item detail.

use crate::clock::Clock;
use crate::request::FeedRequest;
use crate::response::assemble;
use crate::session::{FeedSession, SessionOptions};
use crate::settings::FeedSettings;
use revfeed_core::classify::RoleFilter;
use revfeed_core::errors::Result;
use revfeed_core::model::{LinkRole, ResponseEnvelope, Revision};
use revfeed_core::upstream::Upstream;
use revfeed_core::window::RevisionWindow;
use revfeed_core::{log_op_end, log_op_error, log_op_start};
use revfeed_core_types::RequestContext;
use std::collections::BTreeSet;

/// Reconstruct every change in the requested container and window
///
/// ## Steps
///
/// 1. Validate the revision window (before touching the upstream)
/// 2. Resolve the container and the requested link roles
/// 3. Run the batch under the configured time budget
/// 4. Assemble the envelope
///
/// ## Errors
///
/// - `InvalidRevisionRange`: baseline not lower than the requested end
/// - `UnresolvableContainer`: the path names no container
/// - `HistoryRetrievalInconsistency`: an item returned an empty history
/// - anything the upstream reports, including permission denials
pub fn run_updates_query(
    request: &FeedRequest,
    upstream: &dyn Upstream,
    clock: &dyn Clock,
    settings: &FeedSettings,
    ctx: &RequestContext,
) -> Result<ResponseEnvelope> {
    let container = request.container.to_string();
    log_op_start!(
        "updates_query",
        request_id = ctx.request_id.as_str(),
        container = container.as_str(),
        baseline = request.last_update.get()
    );
    let start = std::time::Instant::now();

    let result = run_updates_query_impl(request, upstream, clock, settings).map_err(|e| {
        log_op_error!(
            "updates_query",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = ctx.request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        "updates_query",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ctx.request_id.as_str(),
        items = result.items.len() as u64,
        response_type = ?result.response_type
    );

    Ok(result)
}

fn run_updates_query_impl(
    request: &FeedRequest,
    upstream: &dyn Upstream,
    clock: &dyn Clock,
    settings: &FeedSettings,
) -> Result<ResponseEnvelope> {
    let window = RevisionWindow::new(
        request.last_update,
        request.end_revision.unwrap_or(Revision::MAX),
    )?;

    let container = upstream.resolve_container(&request.container)?;
    let roles = known_link_roles(&request.included_link_roles, &upstream.link_roles()?);
    let items = upstream.list_items(&container, &request.included_types)?;
    let latest = upstream.latest_known_revision()?;

    let options = SessionOptions {
        roles,
        custom_fields: request.included_custom_fields.clone(),
        known_item_ids: request.known_item_ids.clone(),
        ignored_fields: BTreeSet::new(),
        time_budget: settings.time_budget,
    };

    let batch_start = std::time::Instant::now();
    log_op_start!("batch_run", candidates = items.len() as u64);
    let outcome = FeedSession::new(upstream, clock, &container, window, options).run(&items)?;
    log_op_end!(
        "batch_run",
        duration_ms = batch_start.elapsed().as_millis() as u64,
        processed = outcome.processed as u64,
        response_type = ?outcome.response_type
    );

    Ok(assemble(outcome, &window, latest))
}

/// Keep the requested role ids the upstream defines
fn known_link_roles(requested: &[String], defined: &[LinkRole]) -> RoleFilter {
    let (known, unknown): (Vec<&String>, Vec<&String>) = requested
        .iter()
        .partition(|id| defined.iter().any(|role| &role.id == *id));
    if !unknown.is_empty() {
        tracing::warn!(?unknown, "dropping link roles the upstream does not define");
    }
    RoleFilter::new(known.into_iter().cloned())
}
