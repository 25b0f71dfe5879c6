// error.rs — Error types for the goal store.

use ds_photo::PhotoError;
use ds_storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during goal store operations.
#[derive(Debug, Error)]
pub enum GoalError {
    /// Durable storage rejected a read or write.
    ///
    /// When returned from a mutator, the in-memory change has already been
    /// applied; only the durable copy is stale.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Failed to serialize goal data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The persisted collection could not be decoded and was discarded.
    #[error("stored goals are unreadable and were discarded: {source}")]
    CorruptData { source: serde_json::Error },

    /// The requested goal was not found.
    #[error("goal not found: {0}")]
    NotFound(Uuid),

    /// Goal titles must contain something other than whitespace.
    #[error("goal title must not be empty")]
    EmptyTitle,

    /// The id generator kept returning ids already in the collection.
    #[error("could not generate an unused id")]
    IdsExhausted,

    /// The photo pipeline could not process the image.
    #[error("photo error: {0}")]
    Photo(#[from] PhotoError),

    /// An observer failed to handle an event (non-fatal).
    #[error("observer error: {0}")]
    ObserverError(String),
}

impl GoalError {
    /// True when the durable write was rejected for size reasons.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, GoalError::Storage(e) if e.is_quota_exceeded())
    }
}
