//! Saga instance record.

use common::CorrelationId;
use serde::{Deserialize, Serialize};

use crate::state::SagaState;

/// One persisted onboarding workflow, keyed by its correlation ID.
///
/// The orchestrator is the sole writer: consumers of facts never touch
/// saga state directly, they only emit events the orchestrator interprets.
/// Serializes with the camelCase field names the persisted record uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SagaInstance {
    correlation_id: CorrelationId,
    current_state: SagaState,
    user_created: bool,
    guest_created: bool,
    /// Reserved for a future redelivery backoff policy; not yet consulted.
    retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_reason: Option<String>,
}

impl SagaInstance {
    /// Creates the instance for a newly started workflow.
    ///
    /// The user record exists by the time the start event is published,
    /// so the instance is born in `GuestCreating` with `user_created` set.
    pub fn start(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            current_state: SagaState::GuestCreating,
            user_created: true,
            guest_created: false,
            retry_count: 0,
            failure_reason: None,
        }
    }

    /// Marks the workflow completed after successful guest creation.
    pub fn complete(&mut self) {
        self.current_state = SagaState::Completed;
        self.guest_created = true;
    }

    /// Marks the workflow failed, recording the cause.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.current_state = SagaState::Failed;
        self.failure_reason = Some(reason.into());
    }

    /// Returns the correlation ID keying this instance.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns the current state.
    pub fn state(&self) -> SagaState {
        self.current_state
    }

    /// Returns true if the user record was created.
    pub fn user_created(&self) -> bool {
        self.user_created
    }

    /// Returns true if the guest record was created.
    pub fn guest_created(&self) -> bool {
        self.guest_created
    }

    /// Returns the redelivery count.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}
