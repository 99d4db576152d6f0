//! Router assembly and the listening loop

use crate::config::ServiceConfig;
use crate::routes::{health, updates};
use crate::state::AppState;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use revfeed_core::errors::ExError;
use revfeed_core::{log_op_end, log_op_start};
use revfeed_core_types::RequestId;
use revfeed_store::SqliteUpstreamProvider;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::Instrument;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Store unavailable: {0}")]
    Store(#[from] ExError),

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/is-alive", get(health::is_alive))
        .route(
            "/:project/:space/:document/work-item-updates",
            get(updates::work_item_updates).post(updates::work_item_updates),
        )
        .layer(middleware::from_fn(track_request))
        .with_state(state)
}

/// Serve the feed over the configured SQLite database until Ctrl+C
///
/// Migrations are applied before the listener opens.
pub async fn serve(config: &ServiceConfig) -> Result<(), ServeError> {
    drop(revfeed_store::db::open_migrated(&config.store.database)?);

    let provider = Arc::new(SqliteUpstreamProvider::new(&config.store.database));
    let app = router(AppState::new(provider, config.feed_settings()));

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str())
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.server.bind.clone(),
            source,
        })?;
    tracing::info!(
        addr = %config.server.bind,
        database = %config.store.database.display(),
        time_budget_ms = config.feed.time_budget_ms,
        "revfeed listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
}

/// Stamp every request with an id, echo it back and log the exchange
async fn track_request(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(
        req.headers()
            .get(updates::REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let header = HeaderValue::from_str(request_id.as_str()).ok();
    if let Some(value) = &header {
        req.headers_mut()
            .insert(updates::REQUEST_ID_HEADER, value.clone());
    }

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let span = tracing::info_span!("http_request", request_id = %request_id);

    let start = Instant::now();
    let mut response = async {
        log_op_start!("http_request", method = method.as_str(), path = path.as_str());
        next.run(req).await
    }
    .instrument(span.clone())
    .await;

    span.in_scope(|| {
        log_op_end!(
            "http_request",
            duration_ms = start.elapsed().as_millis() as u64,
            status = response.status().as_u16()
        );
    });

    if let Some(value) = header {
        response
            .headers_mut()
            .insert(updates::REQUEST_ID_HEADER, value);
    }
    response
}
