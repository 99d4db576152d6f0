mod common;

use axum::http::StatusCode;
use common::{app, get_json, seeded_database, send, sqlite_app, UPDATES};
use revfeed_api::routes::health::ALIVE_MESSAGE;
use revfeed_core::model::{FieldValue, Snapshot};
use revfeed_core::upstream::{ContainerPath, InMemoryUpstream};
use std::sync::Arc;

#[tokio::test]
async fn test_is_alive() {
    let (status, _, body) = send(
        app(Arc::new(InMemoryUpstream::builder().build())),
        "GET",
        "/is-alive",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), ALIVE_MESSAGE);
}

#[tokio::test]
async fn test_inverted_window_is_bad_request() {
    let (_dir, db) = seeded_database();
    let (status, body) =
        get_json(sqlite_app(&db), &format!("{}?lastUpdate=9&endRevision=3", UPDATES)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ERR_INVALID_REVISION_RANGE");
}

#[tokio::test]
async fn test_malformed_revision_is_bad_request() {
    let (_dir, db) = seeded_database();
    let (status, body) = get_json(sqlite_app(&db), &format!("{}?lastUpdate=abc", UPDATES)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("lastUpdate"));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (_dir, db) = seeded_database();
    let (status, _, body) = send(sqlite_app(&db), "POST", UPDATES, Some("{\"ids\": 1}")).await;
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ERR_INVALID_INPUT");
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let (_dir, db) = seeded_database();
    let (status, body) =
        get_json(sqlite_app(&db), "/ACME/_default/Nowhere/work-item-updates").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ERR_UNRESOLVABLE_CONTAINER");
}

#[tokio::test]
async fn test_invalid_segment_is_not_found() {
    let (_dir, db) = seeded_database();
    let (status, body) =
        get_json(sqlite_app(&db), "/ACME/_default/bad%3Bname/work-item-updates").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ERR_NOT_FOUND");
}

#[tokio::test]
async fn test_permission_denied_is_forbidden() {
    let doc = ContainerPath::new("ACME", "_default", "Requirements");
    let upstream = InMemoryUpstream::builder()
        .item(
            &doc,
            vec![
                Snapshot::new("WI-1", 1).with_field("title", FieldValue::text("A")),
                Snapshot::new("WI-1", 2).with_field("title", FieldValue::text("B")),
            ],
        )
        .deny_history("WI-1")
        .build();

    let (status, body) = get_json(app(Arc::new(upstream)), UPDATES).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "ERR_PERMISSION_DENIED");
}
