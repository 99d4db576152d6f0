//! Seed import system
//!
//! Provides:
//! - Seed Format v0 schema
//! - YAML parser with validation
//! - Digest canonicalization
//! - Importer orchestration
//! - Provenance tracking

pub mod digest;
pub mod format_v0;
pub mod importer;
pub mod parser;
pub mod provenance;

pub use digest::compute_seed_digest;
pub use format_v0::SeedV0;
pub use importer::{import_seed, import_seed_str, ImportSummary};
pub use parser::{parse_seed_file, parse_seed_str};
