#![allow(clippy::unwrap_used)]

mod common;

use common::{many_items, request};
use revfeed_core::model::ResponseType;
use revfeed_core_types::RequestContext;
use revfeed_engine::{run_updates_query, FeedSettings, ManualClock, SystemClock};
use std::collections::BTreeSet;
use std::time::Duration;

fn tight_budget() -> FeedSettings {
    FeedSettings::with_time_budget(Duration::from_millis(25))
}

#[test]
fn test_budget_exhaustion_returns_partial() {
    let upstream = many_items(5);
    // every reading advances 10ms: items 1 and 2 fit, the third check sees 30ms
    let clock = ManualClock::stepping(Duration::from_millis(10));

    let response = run_updates_query(
        &request(0, 100),
        &upstream,
        &clock,
        &tight_budget(),
        &RequestContext::new(),
    )
    .unwrap();

    assert_eq!(response.response_type, ResponseType::Partial);
    assert!(response.all_item_ids.is_none());
    let ids: Vec<&str> = response.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["WI-01", "WI-02"]);
    // the triggering item was never fetched
    assert_eq!(upstream.history_calls(), 2);
}

#[test]
fn test_partial_envelope_serializes_without_ids() {
    let upstream = many_items(3);
    let clock = ManualClock::stepping(Duration::from_millis(30));

    let response = run_updates_query(
        &request(0, 100),
        &upstream,
        &clock,
        &tight_budget(),
        &RequestContext::new(),
    )
    .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["responseType"], "PARTIAL");
    assert!(json.get("allItemIds").is_none());
    assert_eq!(json["items"].as_array().unwrap().len(), 0);
}

#[test]
fn test_budget_not_exceeded_is_complete() {
    let upstream = many_items(4);
    let clock = ManualClock::new();

    let response = run_updates_query(
        &request(0, 100),
        &upstream,
        &clock,
        &tight_budget(),
        &RequestContext::new(),
    )
    .unwrap();

    assert_eq!(response.response_type, ResponseType::Complete);
    assert_eq!(response.all_item_ids.as_ref().map(Vec::len), Some(4));
}

#[test]
fn test_resuming_with_known_items_completes_the_batch() {
    let upstream = many_items(4);
    let clock = ManualClock::stepping(Duration::from_millis(10));

    let first = run_updates_query(
        &request(0, 100),
        &upstream,
        &clock,
        &tight_budget(),
        &RequestContext::new(),
    )
    .unwrap();
    assert!(first.is_partial());

    let known: BTreeSet<String> = first.items.iter().map(|i| i.id.clone()).collect();
    let second = run_updates_query(
        &request(0, 100).with_known_items(known),
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    assert_eq!(second.response_type, ResponseType::Complete);
    let ids: Vec<&str> = second.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["WI-03", "WI-04"]);
    assert_eq!(second.all_item_ids.as_ref().map(Vec::len), Some(4));
}
