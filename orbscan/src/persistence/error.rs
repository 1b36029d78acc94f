//! Error types for saving and loading scan state.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coverage::CoverageError;

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur saving or loading scan state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to read a state file.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a state file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// The state document is not valid JSON for this format.
    #[error("invalid scan state: {0}")]
    Json(#[from] serde_json::Error),

    /// A body's coverage map could not be encoded.
    #[error("failed to snapshot coverage of {body}: {source}")]
    Snapshot {
        body: String,
        source: CoverageError,
    },
}
