//! Feed request parsing
//!
//! Inbound surfaces (HTTP, CLI) hand raw strings to these helpers so that
//! revision and body validation behaves the same everywhere.

use revfeed_core::errors::{FeedError, Result};
use revfeed_core::model::Revision;
use revfeed_core::upstream::ContainerPath;
use serde::Deserialize;
use std::collections::BTreeSet;

/// One feed query, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub container: ContainerPath,
    /// Baseline; changes at or before it are not reported
    pub last_update: Revision,
    /// Requested window end; `None` means up to the latest revision
    pub end_revision: Option<Revision>,
    pub included_types: Vec<String>,
    pub included_custom_fields: Vec<String>,
    pub included_link_roles: Vec<String>,
    /// Items the caller already holds in sync
    pub known_item_ids: BTreeSet<String>,
}

impl FeedRequest {
    /// Request for every change in `container` since `last_update`
    pub fn new(container: ContainerPath, last_update: Revision) -> Self {
        Self {
            container,
            last_update,
            end_revision: None,
            included_types: Vec::new(),
            included_custom_fields: Vec::new(),
            included_link_roles: Vec::new(),
            known_item_ids: BTreeSet::new(),
        }
    }

    pub fn with_end_revision(mut self, end: Revision) -> Self {
        self.end_revision = Some(end);
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_custom_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_custom_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_link_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_link_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_known_items(mut self, ids: BTreeSet<String>) -> Self {
        self.known_item_ids = ids;
        self
    }
}

/// Parse an optional revision parameter
///
/// Missing or blank values yield `None`.
///
/// # Errors
///
/// Returns `FeedError::InvalidRevisionRange` for anything that is not a
/// non-negative integer.
pub fn parse_revision(name: &str, raw: Option<&str>) -> Result<Option<Revision>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<Revision>()
        .map(Some)
        .map_err(|_| FeedError::InvalidRevisionRange {
            reason: format!("{} must be a non-negative integer, got '{}'", name, raw),
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KnownItemsBody {
    Ids(Vec<String>),
    #[serde(rename_all = "camelCase")]
    Wrapped { known_item_ids: Vec<String> },
}

/// Parse the optional request body listing item ids the caller already holds
///
/// Accepts a JSON array of ids or an object with a `knownItemIds` array. An
/// empty body means no known items.
///
/// # Errors
///
/// Returns `FeedError::InvalidRequestBody` for any other shape.
pub fn parse_known_items(body: &[u8]) -> Result<BTreeSet<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeSet::new());
    }
    let parsed: KnownItemsBody =
        serde_json::from_slice(body).map_err(|e| FeedError::InvalidRequestBody {
            reason: format!("expected an array of item ids: {}", e),
        })?;
    let ids = match parsed {
        KnownItemsBody::Ids(ids) | KnownItemsBody::Wrapped { known_item_ids: ids } => ids,
    };
    Ok(ids.into_iter().collect())
}
