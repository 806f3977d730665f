use thiserror::Error;

use crate::{CorrelationId, Version};

/// Errors that can occur when interacting with the saga instance store.
#[derive(Debug, Error)]
pub enum SagaStoreError {
    /// A conditional write lost the race against another writer.
    /// The losing writer must re-read and retry its transition.
    #[error(
        "concurrency conflict for saga {correlation_id}: expected version {expected}, found {actual}"
    )]
    Conflict {
        correlation_id: CorrelationId,
        expected: Version,
        actual: Version,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for saga store operations.
pub type Result<T> = std::result::Result<T, SagaStoreError>;
