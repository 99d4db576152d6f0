//! revfeed API - HTTP surface of the change feed
//!
//! - `GET|POST /{project}/{space}/{document}/work-item-updates`
//! - `GET /is-alive`
//!
//! Each request opens its own upstream handle and runs the synchronous
//! engine on the blocking pool.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use server::{router, serve};
pub use state::AppState;
