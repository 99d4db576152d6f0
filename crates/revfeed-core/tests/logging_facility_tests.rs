#![allow(clippy::unwrap_used, clippy::expect_used)]

use revfeed_core::errors::FeedError;
use revfeed_core::logging_facility::test_capture::init_test_capture;
use revfeed_core::{log_op_end, log_op_error, log_op_start};
use revfeed_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event() == Some(EVENT_START))
        .collect();

    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42u64);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = FeedError::HistoryRetrievalInconsistency {
        item_id: "WI-7".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10u64);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(
        error_events[0].field("err_code"),
        Some("ERR_HISTORY_RETRIEVAL_INCONSISTENCY")
    );
}

#[test]
fn test_boundary_ownership_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_ownership_unique_4";

    log_op_start!(op_name, item_id = "WI-1");
    log_op_end!(op_name, duration_ms = 42u64);

    assert_eq!(capture.count(op_name, EVENT_START), 1, "Should have exactly one start event");
    assert_eq!(capture.count(op_name, EVENT_END), 1, "Should have exactly one end event");
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_5";

    log_op_start!(op_name, container = "elibrary/Specs/Requirements", baseline = 12u64);

    let events = capture.events_for_op(op_name);
    let start_event = events.first().expect("Should have start event");

    assert_eq!(
        start_event.field("container"),
        Some("elibrary/Specs/Requirements")
    );
    assert_eq!(start_event.field("baseline"), Some("12"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_error_conversion_preserves_kind() {
    let capture = init_test_capture();
    let op_name = "test_error_conversion_unique_6";

    let err = FeedError::PermissionDenied {
        message: "no read access".to_string(),
    };
    log_op_error!(op_name, err.clone(), duration_ms = 5u64);

    let events = capture.events_for_op(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event() == Some(EVENT_END_ERROR))
        .expect("Should have error event for this test");

    assert_eq!(error_event.field("err_kind"), Some("PermissionDenied"));
    assert_eq!(error_event.level, tracing::Level::ERROR);
}
