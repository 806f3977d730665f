//! Account service error types.

use messaging::BusError;
use thiserror::Error;

/// Errors that can occur in the user and guest creation services.
#[derive(Debug, Error)]
pub enum AccountsError {
    /// A record with this email already exists.
    #[error("duplicate email")]
    DuplicateEmail(String),

    /// The backing store rejected the unit of work.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// Event bus error.
    #[error("event bus error: {0}")]
    Bus(#[from] BusError),
}

/// Convenience type alias for account service results.
pub type Result<T> = std::result::Result<T, AccountsError>;
