// error.rs — Error types for the key-value storage port.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused the write because it would exceed its size ceiling.
    #[error("storage quota exceeded writing '{key}': {size} bytes (limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The key cannot be mapped onto the backend (empty, or contains path separators).
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    /// True when the failure is a quota rejection rather than an I/O fault.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}
