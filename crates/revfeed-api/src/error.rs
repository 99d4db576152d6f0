//! HTTP error mapping
//!
//! Every failure leaves the service as
//! `{ "error": { "code": "ERR_…", "message": "…" } }` with the status the
//! error kind maps to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use revfeed_core::errors::{ExError, ExErrorKind, FeedError};
use serde::Serialize;

/// Error returned by route handlers
#[derive(Debug, Clone)]
pub struct ApiError(pub ExError);

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    /// Path does not name a feed resource
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(
            ExError::new(ExErrorKind::NotFound)
                .with_op("route")
                .with_message(message),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self(ExError::new(ExErrorKind::Internal).with_message(message))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ExError> for ApiError {
    fn from(err: ExError) -> Self {
        Self(err)
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.0.code(),
                message: self.0.message(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
