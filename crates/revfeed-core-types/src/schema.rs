//! Field keys and event names for structured logging
//!
//! Every log line emitted through the `log_op_*` macros uses these keys, so
//! log queries can rely on them across crates.

// Envelope fields
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Feed identifiers
pub const FIELD_ITEM_ID: &str = "item_id";
pub const FIELD_CONTAINER: &str = "container";
pub const FIELD_REVISION: &str = "revision";
pub const FIELD_BASELINE: &str = "baseline";
pub const FIELD_END_REVISION: &str = "end_revision";

// Batch counters
pub const FIELD_CANDIDATES: &str = "candidates";
pub const FIELD_PROCESSED: &str = "processed";
pub const FIELD_RESPONSE_TYPE: &str = "response_type";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
