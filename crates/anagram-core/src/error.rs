//! Error types for the anagram core
//!
//! Storage failures are collapsed into a single [`StoreError`] carrying the
//! failed operation and its underlying cause; [`CoreError`] adds the
//! dictionary-level conditions on top.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a storage backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend did not answer within the configured call timeout
    #[error("Storage operation '{operation}' timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },

    /// The backend answered with an error (connection, query or constraint)
    #[error("Storage operation '{operation}' failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema creation or inspection failed
    #[error("Storage schema error: {message}")]
    Schema { message: String },

    /// A value could not be represented by the backend
    #[error("Storage value out of range in '{operation}': {message}")]
    OutOfRange { operation: &'static str, message: String },
}

impl StoreError {
    /// Wrap a backend error for `operation`.
    pub fn backend(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend { operation, source: source.into() }
    }

    /// Whether the failure means the backend is unreachable rather than rejecting a request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for index, statistics and dictionary operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// No bucket exists for the requested key
    #[error("No words stored under key '{key}'")]
    NotFound { key: String },

    /// The exact word is already in the dictionary
    #[error("The word: {word} is already in the dictionary.")]
    WordExists { word: String },

    /// The storage backend failed
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The seed word list could not be read
    #[error("Failed to read word list '{}': {source}", .path.display())]
    WordList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Create a not found error for `key`
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a duplicate word error
    pub fn word_exists(word: impl Into<String>) -> Self {
        Self::WordExists { word: word.into() }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
