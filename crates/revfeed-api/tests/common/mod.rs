use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use revfeed_api::{router, AppState};
use revfeed_core::upstream::UpstreamProvider;
use revfeed_engine::FeedSettings;
use revfeed_store::SqliteUpstreamProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub const UPDATES: &str = "/ACME/_default/Requirements/work-item-updates";

/// Database seeded with the store's requirements fixture; keep the dir alive
#[allow(dead_code)]
pub fn seeded_database() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.db");
    let mut conn = revfeed_store::db::open_migrated(&path).unwrap();
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../revfeed-store/tests/fixtures/requirements.yaml");
    revfeed_store::seed::import_seed(&fixture, &mut conn).unwrap();
    (dir, path)
}

#[allow(dead_code)]
pub fn sqlite_app(path: &PathBuf) -> Router {
    app(Arc::new(SqliteUpstreamProvider::new(path)))
}

pub fn app(provider: Arc<dyn UpstreamProvider>) -> Router {
    router(AppState::new(provider, FeedSettings::default()))
}

/// Send one request through the router; returns status, headers and body bytes
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

#[allow(dead_code)]
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(app, "GET", uri, None).await;
    (status, serde_json::from_slice(&body).unwrap())
}
