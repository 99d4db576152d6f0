//! revfeed Store - SQLite reference upstream with seed import
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Seed Format v0 parser and importer
//! - [`SqliteUpstream`], a `Catalog` + `SnapshotSource` over the imported data

pub mod db;
pub mod errors;
pub mod migrations;
pub mod seed;
pub mod upstream;

// Re-export key types
pub use errors::Result;
pub use upstream::{SqliteUpstream, SqliteUpstreamProvider};
