//! Error handling for storymap-store
//!
//! Wraps the core `ExError` with store-specific helpers

use storymap_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a snapshot validation error
pub fn snapshot_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Validation)
        .with_op("snapshot_parse")
        .with_message(reason.to_string())
}

/// Create a snapshot validation error naming the offending record
pub fn snapshot_reference(entity_id: &str, reason: &str) -> ExError {
    snapshot_validation(reason).with_entity_id(entity_id)
}

/// Create a serialization error for `operation`
pub fn serialization_error(operation: &str, err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
