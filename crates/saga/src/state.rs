//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of an onboarding saga in its lifecycle.
///
/// State transitions:
/// ```text
/// (no instance) ──► GuestCreating ──┬──► Completed
///                                   └──► Failed
/// ```
///
/// There is no stored "initial" state: an instance only comes into
/// existence when the start event is first consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SagaState {
    /// The user exists and the workflow is waiting on guest creation.
    GuestCreating,

    /// The guest record was created (terminal state).
    Completed,

    /// Guest creation failed (terminal state).
    Failed,
}

impl SagaState {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Completed | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::GuestCreating => "GuestCreating",
            SagaState::Completed => "Completed",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
