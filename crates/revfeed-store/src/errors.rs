//! Error handling for revfeed-store
//!
//! Wraps revfeed-core ExError with store-specific helpers

use revfeed_core::errors::{ExError, ExErrorKind, FeedError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a seed validation error
pub fn seed_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("seed_parse")
        .with_message(reason.to_string())
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Report a database failure through the upstream contract
pub fn upstream_failure(op: &str, err: rusqlite::Error) -> FeedError {
    FeedError::Upstream {
        op: op.to_string(),
        message: err.to_string(),
    }
}

/// Report a corrupt stored snapshot through the upstream contract
pub fn corrupt_snapshot(item_id: &str, err: serde_json::Error) -> FeedError {
    FeedError::Upstream {
        op: "snapshot_history".to_string(),
        message: format!("stored snapshot for {} is unreadable: {}", item_id, err),
    }
}
