//! `/{project}/{space}/{document}/work-item-updates`
//!
//! Query parameters are read as raw pairs so repeatable filters work in
//! every spelling clients send: `includedTypes=a&includedTypes=b`,
//! `includedTypes[]=a`, and the longer `includedWorkItemTypes` form.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use revfeed_core::errors::Result;
use revfeed_core::model::{ResponseEnvelope, Revision};
use revfeed_core::upstream::ContainerPath;
use revfeed_core_types::RequestContext;
use revfeed_engine::request::{parse_known_items, parse_revision};
use revfeed_engine::{run_updates_query, FeedRequest};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Filters and window read from the query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedParams {
    pub last_update: Option<Revision>,
    pub end_revision: Option<Revision>,
    pub types: Vec<String>,
    pub custom_fields: Vec<String>,
    pub link_roles: Vec<String>,
}

impl FeedParams {
    /// Collect parameters from decoded query pairs
    ///
    /// Unknown keys are ignored. Blank values of repeatable filters are skipped.
    ///
    /// # Errors
    ///
    /// `FeedError::InvalidRevisionRange` when a revision is not a
    /// non-negative integer.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        let mut params = FeedParams::default();
        for (key, value) in pairs {
            let key = key.strip_suffix("[]").unwrap_or(key);
            match key {
                "lastUpdate" => params.last_update = parse_revision(key, Some(value.as_str()))?,
                "endRevision" => params.end_revision = parse_revision(key, Some(value.as_str()))?,
                "includedTypes" | "includedWorkItemTypes" => push_value(&mut params.types, value),
                "includedCustomFields" | "includedWorkItemCustomFields" => {
                    push_value(&mut params.custom_fields, value)
                }
                "includedLinkRoles" | "includedWorkItemLinkRoles" => {
                    push_value(&mut params.link_roles, value)
                }
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn into_request(self, container: ContainerPath) -> FeedRequest {
        let mut request = FeedRequest::new(container, self.last_update.unwrap_or(Revision::ZERO))
            .with_types(self.types)
            .with_custom_fields(self.custom_fields)
            .with_link_roles(self.link_roles);
        if let Some(end) = self.end_revision {
            request = request.with_end_revision(end);
        }
        request
    }
}

fn push_value(target: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !target.iter().any(|v| v == value) {
        target.push(value.to_string());
    }
}

/// Path segments may only hold letters, digits, `_`, `-`, `.` and spaces
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
}

/// Handler for both GET and POST
pub async fn work_item_updates(
    State(state): State<AppState>,
    Path((project, space, document)): Path<(String, String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<ResponseEnvelope>, ApiError> {
    let ctx = RequestContext::from_headers(
        header_value(&headers, REQUEST_ID_HEADER),
        header_value(&headers, TRACE_ID_HEADER),
    );

    if ![&project, &space, &document]
        .iter()
        .all(|segment| is_valid_segment(segment))
    {
        return Err(ApiError::not_found("The requested resource is not found"));
    }

    let container = ContainerPath::new(project, space, document);
    let known = parse_known_items(&body)?;
    let request = FeedParams::from_pairs(&pairs)?
        .into_request(container)
        .with_known_items(known);

    let envelope = tokio::task::spawn_blocking(move || -> Result<ResponseEnvelope> {
        let upstream = state.provider.open()?;
        run_updates_query(
            &request,
            upstream.as_ref(),
            state.clock.as_ref(),
            &state.settings,
            &ctx,
        )
    })
    .await
    .map_err(|e| ApiError::internal(format!("feed worker failed: {}", e)))??;

    Ok(Json(envelope))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use revfeed_core::errors::FeedError;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_every_spelling_of_repeatable_filters() {
        let params = FeedParams::from_pairs(&pairs(&[
            ("includedTypes", "task"),
            ("includedTypes[]", "requirement"),
            ("includedWorkItemTypes", "task"),
            ("includedWorkItemCustomFields[]", "severity"),
            ("includedLinkRoles", "blocks"),
            ("includedWorkItemLinkRoles", " "),
        ]))
        .unwrap();
        assert_eq!(params.types, vec!["task", "requirement"]);
        assert_eq!(params.custom_fields, vec!["severity"]);
        assert_eq!(params.link_roles, vec!["blocks"]);
    }

    #[test]
    fn test_revisions_default_and_parse() {
        let params = FeedParams::from_pairs(&[]).unwrap();
        let request = params.into_request(ContainerPath::new("p", "s", "d"));
        assert_eq!(request.last_update, Revision::ZERO);
        assert_eq!(request.end_revision, None);

        let params =
            FeedParams::from_pairs(&pairs(&[("lastUpdate", "4"), ("endRevision", "9")])).unwrap();
        assert_eq!(params.last_update, Some(Revision::new(4)));
        assert_eq!(params.end_revision, Some(Revision::new(9)));
    }

    #[test]
    fn test_bad_revision_is_rejected() {
        let err = FeedParams::from_pairs(&pairs(&[("lastUpdate", "yesterday")])).unwrap_err();
        assert!(matches!(err, FeedError::InvalidRevisionRange { .. }));
    }

    #[test]
    fn test_segment_validation() {
        assert!(is_valid_segment("ACME"));
        assert!(is_valid_segment("_default"));
        assert!(is_valid_segment("Requirements v1.2"));
        assert!(!is_valid_segment(""));
        assert!(!is_valid_segment("a/b"));
        assert!(!is_valid_segment("drop;table"));
    }
}
