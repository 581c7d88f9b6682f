//! Error types for the sync pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while loading, reconciling or applying records.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Input has the wrong shape (root not an array, element not an object, missing key).
    #[error("invalid format: {0}")]
    Format(String),

    /// I/O error while reading local input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Network or remote API error.
    #[error("network error: {0}")]
    Network(String),

    /// The remote collection no longer holds a document a write targets.
    #[error("remote conflict: {0}")]
    Conflict(String),

    /// A write group failed to commit.
    #[error("group {group} failed to commit: {reason}")]
    BatchCommit { group: usize, reason: String },

    /// A write group exceeded the store's per-call limit.
    #[error("cannot write {size} operations in a single call (limit {limit})")]
    OversizeBatch { size: usize, limit: usize },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Returns true for errors raised before any remote call is made.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SyncError::NotFound(_) | SyncError::Format(_) | SyncError::Io(_) | SyncError::Serialization(_)
        )
    }
}
