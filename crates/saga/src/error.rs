//! Saga error types.

use messaging::BusError;
use saga_store::SagaStoreError;
use thiserror::Error;

/// Errors that can occur while orchestrating a saga.
///
/// None of these terminates the orchestrator: a failed delivery is logged
/// and the event is left to the transport's redelivery, which the
/// transition logic tolerates by being idempotent.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Instance store error.
    #[error("saga store error: {0}")]
    Store(#[from] SagaStoreError),

    /// Event bus error.
    #[error("event bus error: {0}")]
    Bus(#[from] BusError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
