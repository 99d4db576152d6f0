//! Command orchestration layer.
//!
//! Entry points that coordinate the upstream collaborator with the core
//! reconstruction logic and own boundary logging.

pub mod updates;
