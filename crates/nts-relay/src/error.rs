//! Error types for the relay store.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur while storing or querying events.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Event failed structural, ID, or signature checks.
    #[error("invalid: {0}")]
    Invalid(String),

    /// An event with the same ID is already stored.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Event was refused by storage policy (e.g. a newer replaceable
    /// version already exists).
    #[error("rejected: {0}")]
    Rejected(String),

    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding of stored columns.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The blocking storage worker panicked or was cancelled.
    #[error("storage worker failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for RelayError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
