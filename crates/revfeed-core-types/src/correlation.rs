//! Correlation types for request tracking
//!
//! Every inbound feed request gets a `RequestId`. Callers may pass their own
//! ids through headers; anything that is not a UUID is replaced with a fresh
//! one so log correlation never carries arbitrary client text.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single feed request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Adopt a caller-supplied id if it parses as a UUID, otherwise generate one
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(|uuid| Self(uuid.to_string()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trace identifier propagated from an upstream caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accept a caller-supplied trace id, rejecting non-UUID input
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim())
            .ok()
            .map(|uuid| Self(uuid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation context for one feed request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from raw `x-request-id` / `x-trace-id` header values
    pub fn from_headers(request_id: Option<&str>, trace_id: Option<&str>) -> Self {
        Self {
            request_id: RequestId::from_header(request_id),
            trace_id: trace_id.and_then(TraceId::parse),
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_adopts_valid_uuid_header() {
        let raw = "0190a4c2-7b1e-7c3d-9f00-123456789abc";
        let id = RequestId::from_header(Some(raw));
        assert_eq!(id.as_str(), raw);
    }

    #[test]
    fn test_request_id_replaces_garbage_header() {
        let id = RequestId::from_header(Some("not a uuid; drop table"));
        assert_ne!(id.as_str(), "not a uuid; drop table");
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_trace_id_parse() {
        assert!(TraceId::parse("nope").is_none());
        let trace = TraceId::new();
        assert_eq!(TraceId::parse(trace.as_str()), Some(trace));
    }

    #[test]
    fn test_request_context_from_headers() {
        let ctx = RequestContext::from_headers(None, Some("bad"));
        assert!(!ctx.request_id.as_str().is_empty());
        assert!(ctx.trace_id.is_none());

        let trace = TraceId::new();
        let ctx = RequestContext::new().with_trace_id(trace.clone());
        assert_eq!(ctx.trace_id, Some(trace));
    }

    #[test]
    fn test_request_id_serde_is_transparent_string() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
    }
}
