pub mod seed;
pub mod serve;
pub mod updates;

/// Database used when `--db` is not given
pub const DEFAULT_DB: &str = "revfeed.db";
