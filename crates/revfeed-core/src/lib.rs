//! revfeed core - change reconstruction over item snapshot histories
//!
//! This crate holds everything that does not depend on how a request
//! arrives or where snapshots are stored:
//! - the feed data model (snapshots, field diffs, change records, responses)
//! - revision window location over an item's history
//! - the pairwise diff walk and collection classification
//! - backward link synthesis for the opposite end of relationships
//! - state projection and the value stringification convention
//! - the upstream collaborator traits plus an in-memory implementation
//!
//! Batch orchestration lives in `revfeed-engine`.

pub mod backlinks;
pub mod classify;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod projection;
pub mod stringify;
pub mod upstream;
pub mod walker;
pub mod window;

pub use revfeed_core_types as core_types;

// Re-export commonly used types
pub use backlinks::{synthesize_current_links, BacklinkRegistry};
pub use classify::RoleFilter;
pub use errors::{ExError, ExErrorKind, FeedError, Result};
pub use model::{ItemChangeSet, ResponseEnvelope, Revision, Snapshot};
pub use upstream::{Catalog, SnapshotSource, Upstream, UpstreamProvider};
pub use walker::{DiffWalker, WalkOutcome};
pub use window::{locate_start, RevisionWindow};
