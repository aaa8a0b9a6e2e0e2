//! Error types for playlist editor operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in playlist editor operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An index passed to remove/reorder is outside the current bounds.
    #[error("Index {index} out of range for playlist of length {len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the collection at the time of the call.
        len: usize,
    },

    /// A URL or query failed validation on the backend.
    #[error("Validation failed for {input}: {reason}")]
    ValidationFailed {
        /// The input that was rejected.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No entry carries the given correlation key.
    #[error("No track with id {0} in playlist")]
    NotFound(i64),

    /// The playlist file cannot be imported.
    #[error("Invalid playlist file {path}: {reason}")]
    InvalidPlaylistFile {
        /// Path of the rejected file.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP transport error talking to the backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a validation failure for the given input.
    pub fn validation(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a validation failure reported by the backend.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}
