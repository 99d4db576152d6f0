use revfeed_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using FeedError
pub type Result<T> = std::result::Result<T, FeedError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code for programmatic handling and to
/// the HTTP status the feed endpoint answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Request validation
    InvalidRevisionRange,
    InvalidInput,

    // Resolution
    UnresolvableContainer,
    NotFound,

    // Upstream authorization
    PermissionDenied,
    AccessDenied,

    // Reconstruction
    /// A collection element matched no known shape (recovered locally)
    CollectionElementCastMismatch,
    /// History-capable item returned an empty history
    HistoryRetrievalInconsistency,

    // Integration/IO
    Upstream,
    Io,
    Serialization,
    Persistence,
    ConstraintViolation,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidRevisionRange => "ERR_INVALID_REVISION_RANGE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::UnresolvableContainer => "ERR_UNRESOLVABLE_CONTAINER",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::PermissionDenied => "ERR_PERMISSION_DENIED",
            ExErrorKind::AccessDenied => "ERR_ACCESS_DENIED",
            ExErrorKind::CollectionElementCastMismatch => "ERR_COLLECTION_ELEMENT_CAST_MISMATCH",
            ExErrorKind::HistoryRetrievalInconsistency => "ERR_HISTORY_RETRIEVAL_INCONSISTENCY",
            ExErrorKind::Upstream => "ERR_UPSTREAM",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// HTTP status the feed endpoint reports for this kind
    pub fn http_status(&self) -> u16 {
        match self {
            ExErrorKind::InvalidRevisionRange | ExErrorKind::InvalidInput => 400,
            ExErrorKind::PermissionDenied | ExErrorKind::AccessDenied => 403,
            ExErrorKind::UnresolvableContainer | ExErrorKind::NotFound => 404,
            ExErrorKind::CollectionElementCastMismatch
            | ExErrorKind::HistoryRetrievalInconsistency
            | ExErrorKind::Upstream
            | ExErrorKind::Io
            | ExErrorKind::Serialization
            | ExErrorKind::Persistence
            | ExErrorKind::ConstraintViolation
            | ExErrorKind::Internal => 500,
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the context needed to correlate a
/// failure with the request and item that produced it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    item_id: Option<String>,
    container: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            item_id: None,
            container: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_item_id(mut self, id: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(item_id) = &self.item_id {
            write!(f, " (item_id: {})", item_id)?;
        }
        if let Some(container) = &self.container {
            write!(f, " (container: {})", container)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Failures raised while reconstructing a change feed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Baseline/end revision pair is unusable
    #[error("Invalid revision range: {reason}")]
    InvalidRevisionRange { reason: String },

    /// Request body could not be read as a list of item ids
    #[error("Invalid request body: {reason}")]
    InvalidRequestBody { reason: String },

    /// Path does not name a real project/space/document combination
    #[error("Unresolvable container: {path}")]
    UnresolvableContainer { path: String },

    /// Upstream refused the operation for the current principal
    #[error("Permission denied by upstream: {message}")]
    PermissionDenied { message: String },

    /// Upstream refused access to a specific resource
    #[error("Access denied by upstream: {message}")]
    AccessDenied { message: String },

    /// Collection element of an unrecognized shape
    #[error("Collection element cast mismatch in field {field}: {reason}")]
    CollectionElementCastMismatch { field: String, reason: String },

    /// History-capable item returned no snapshots
    #[error("History retrieval returned no snapshots for item {item_id}")]
    HistoryRetrievalInconsistency { item_id: String },

    /// Upstream collaborator failed for a reason of its own
    #[error("Upstream failure in {op}: {message}")]
    Upstream { op: String, message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Catch-all for invariant breaks inside the engine
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<FeedError> for ExError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::InvalidRevisionRange { reason } => {
                ExError::new(ExErrorKind::InvalidRevisionRange)
                    .with_op("parse_revision_window")
                    .with_message(reason)
            }
            FeedError::InvalidRequestBody { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_known_items")
                .with_message(reason),
            FeedError::UnresolvableContainer { path } => {
                ExError::new(ExErrorKind::UnresolvableContainer)
                    .with_op("resolve_container")
                    .with_container(path)
                    .with_message("The requested resource is not found")
            }
            FeedError::PermissionDenied { message } => {
                ExError::new(ExErrorKind::PermissionDenied).with_message(message)
            }
            FeedError::AccessDenied { message } => {
                ExError::new(ExErrorKind::AccessDenied).with_message(message)
            }
            FeedError::CollectionElementCastMismatch { field, reason } => {
                ExError::new(ExErrorKind::CollectionElementCastMismatch)
                    .with_op("classify_collection")
                    .with_message(format!("{}: {}", field, reason))
            }
            FeedError::HistoryRetrievalInconsistency { item_id } => {
                ExError::new(ExErrorKind::HistoryRetrievalInconsistency)
                    .with_op("snapshot_history")
                    .with_item_id(item_id)
                    .with_message("History-capable item returned an empty history")
            }
            FeedError::Upstream { op, message } => ExError::new(ExErrorKind::Upstream)
                .with_op(op)
                .with_message(message),
            FeedError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            FeedError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_by_kind() {
        let cases = [
            (ExErrorKind::InvalidRevisionRange, 400),
            (ExErrorKind::InvalidInput, 400),
            (ExErrorKind::PermissionDenied, 403),
            (ExErrorKind::AccessDenied, 403),
            (ExErrorKind::UnresolvableContainer, 404),
            (ExErrorKind::HistoryRetrievalInconsistency, 500),
            (ExErrorKind::Upstream, 500),
        ];
        for (kind, status) in cases {
            assert_eq!(kind.http_status(), status, "Wrong status for {:?}", kind);
        }
    }

    #[test]
    fn test_history_inconsistency_keeps_item_context() {
        let err: ExError = FeedError::HistoryRetrievalInconsistency {
            item_id: "WI-7".to_string(),
        }
        .into();
        assert_eq!(err.code(), "ERR_HISTORY_RETRIEVAL_INCONSISTENCY");
        assert_eq!(err.item_id(), Some("WI-7"));
        assert_eq!(err.op(), Some("snapshot_history"));
    }

    #[test]
    fn test_display_includes_code_op_and_message() {
        let err = ExError::new(ExErrorKind::UnresolvableContainer)
            .with_op("resolve_container")
            .with_container("p/s/d")
            .with_message("missing");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_UNRESOLVABLE_CONTAINER]"));
        assert!(text.contains("resolve_container"));
        assert!(text.contains("(container: p/s/d)"));
    }
}
