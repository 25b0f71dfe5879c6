// error.rs — Error types for reminder scheduling and delivery.

use std::path::PathBuf;

use ds_storage::StorageError;
use thiserror::Error;

/// Errors that can occur while delivering a reminder.
///
/// None of these are fatal: the scheduler logs them and carries on.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Reading or writing the last-notified marker failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A sink could not write its output.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize a reminder.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A sink rejected the reminder for some other reason.
    #[error("sink error: {0}")]
    SinkError(String),
}
