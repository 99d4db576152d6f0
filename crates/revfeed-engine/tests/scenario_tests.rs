#![allow(clippy::unwrap_used)]

mod common;

use common::{blocks, blocks_scenario, doc, request, requirement};
use revfeed_core::model::{
    FieldChange, LinkDirection, LinkedItem, ResponseType, Revision, StateValue, UpdateType,
    LINKED_ITEMS_FIELD,
};
use revfeed_core::upstream::InMemoryUpstream;
use revfeed_core_types::RequestContext;
use revfeed_engine::{run_updates_query, FeedSettings, SystemClock};

#[test]
fn test_title_change_and_blocks_link() {
    let upstream = blocks_scenario().build();
    let req = request(0, 9).with_link_roles(["blocks"]);

    let response = run_updates_query(
        &req,
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    assert_eq!(response.response_type, ResponseType::Complete);
    assert_eq!(response.from_revision, Revision::new(1));
    assert_eq!(response.to_revision, Revision::new(9));

    let origin = response.item("WI-1").unwrap();
    assert_eq!(origin.update_type, UpdateType::Updated);
    assert_eq!(origin.revision, Revision::new(9));
    assert_eq!(origin.changes.len(), 2);

    assert_eq!(origin.changes[0].revision, Revision::new(5));
    assert_eq!(
        origin.changes[0].field_changes,
        vec![FieldChange::Scalar {
            field_name: "title".into(),
            before: "A".into(),
            after: "B".into(),
        }]
    );

    assert_eq!(origin.changes[1].revision, Revision::new(9));
    assert_eq!(
        origin.changes[1].field_changes,
        vec![FieldChange::Relationship {
            field_name: LINKED_ITEMS_FIELD.into(),
            link_role_id: "blocks".into(),
            link_role_name: "blocks".into(),
            link_direction: LinkDirection::Outgoing,
            added: vec!["WI-X".into()],
            removed: vec![],
        }]
    );
    assert_eq!(origin.linked_items, vec![LinkedItem::outgoing("WI-X", &blocks())]);

    let target = response.item("WI-X").unwrap();
    assert_eq!(target.changes.len(), 1);
    assert_eq!(target.changes[0].revision, Revision::new(9));
    assert_eq!(
        target.changes[0].field_changes,
        vec![FieldChange::Relationship {
            field_name: LINKED_ITEMS_FIELD.into(),
            link_role_id: "blocks".into(),
            link_role_name: "is blocked by".into(),
            link_direction: LinkDirection::Incoming,
            added: vec!["WI-1".into()],
            removed: vec![],
        }]
    );
    assert_eq!(target.linked_items, vec![LinkedItem::incoming("WI-1", &blocks())]);

    assert_eq!(
        response.all_item_ids,
        Some(vec!["WI-1".to_string(), "WI-X".to_string()])
    );
}

#[test]
fn test_links_excluded_without_requested_roles() {
    let upstream = blocks_scenario().build();

    let response = run_updates_query(
        &request(0, 9),
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    let origin = response.item("WI-1").unwrap();
    let revisions: Vec<u64> = origin.changes.iter().map(|r| r.revision.get()).collect();
    assert_eq!(revisions, vec![5, 9]);
    // the link at 9 is filtered out, but the revision still reports a change
    assert!(origin.changes[1].field_changes.is_empty());
    assert!(origin.linked_items.is_empty());
    assert!(response.item("WI-X").unwrap().changes.is_empty());
}

#[test]
fn test_removed_item_gets_deleted_marker_without_diffing() {
    let upstream = InMemoryUpstream::builder()
        .removed_item(
            &doc(),
            vec![requirement("WI-4", 2, "old"), requirement("WI-4", 7, "gone")],
        )
        .build();

    let response = run_updates_query(
        &request(0, 10),
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    let marker = response.item("WI-4").unwrap();
    assert_eq!(marker.update_type, UpdateType::Deleted);
    assert_eq!(marker.revision, Revision::new(7));
    assert!(marker.state.is_none());
    assert!(marker.changes.is_empty());
    assert_eq!(upstream.diff_calls(), 0);
    assert_eq!(upstream.history_calls(), 0);
    assert_eq!(response.all_item_ids, Some(vec![]));
}

#[test]
fn test_removed_outside_window_is_silent() {
    let upstream = InMemoryUpstream::builder()
        .removed_item(&doc(), vec![requirement("WI-4", 3, "gone")])
        .item(&doc(), vec![requirement("WI-5", 12, "new")])
        .build();

    let response = run_updates_query(
        &request(5, 20),
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    assert!(response.item("WI-4").is_none());
    assert!(response.item("WI-5").is_some());
}

#[test]
fn test_state_reflects_end_of_window() {
    let upstream = blocks_scenario().build();

    let response = run_updates_query(
        &request(0, 6),
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    let origin = response.item("WI-1").unwrap();
    assert_eq!(origin.revision, Revision::new(5));
    let state = origin.state.as_ref().unwrap();
    assert_eq!(state.fields["title"], StateValue::Text("B".into()));
    assert_eq!(state.item_type, "requirement");
    assert_eq!(response.to_revision, Revision::new(6));
}

#[test]
fn test_created_after_window_end_is_not_reported() {
    let upstream = InMemoryUpstream::builder()
        .item(
            &doc(),
            vec![requirement("WI-7", 15, "late"), requirement("WI-7", 18, "later")],
        )
        .item(&doc(), vec![requirement("WI-8", 16, "single")])
        .build();

    let response = run_updates_query(
        &request(0, 10),
        &upstream,
        &SystemClock,
        &FeedSettings::default(),
        &RequestContext::new(),
    )
    .unwrap();

    assert!(response.items.is_empty());
    assert_eq!(
        response.all_item_ids,
        Some(vec!["WI-7".to_string(), "WI-8".to_string()])
    );
}
