//! Onboarding workflow events.

use common::CorrelationId;
use serde::{Deserialize, Serialize};

/// Events exchanged between the onboarding services.
///
/// Messages are immutable values with no identity beyond their correlation
/// ID. Field names serialize in camelCase to match the broker payloads the
/// downstream services consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OnboardingEvent {
    /// A user record was persisted and a workflow should begin.
    OnboardingRequested(OnboardingRequestedData),

    /// Fact broadcast by the orchestrator once it has acknowledged the
    /// request; consumed by downstream creation handlers.
    UserCreated(UserCreatedData),

    /// The guest record for this workflow was created.
    GuestCreated(GuestCreatedData),

    /// Guest creation failed; carries a short diagnostic reason.
    GuestCreationFailed(GuestCreationFailedData),
}

/// Data for the OnboardingRequested event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequestedData {
    /// Correlation ID minted by the user service, never reused.
    pub correlation_id: CorrelationId,
    /// Display name of the new user.
    pub name: String,
    /// Email of the new user.
    pub email: String,
}

/// Data for the UserCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedData {
    pub correlation_id: CorrelationId,
    pub name: String,
    pub email: String,
}

/// Data for the GuestCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCreatedData {
    pub correlation_id: CorrelationId,
}

/// Data for the GuestCreationFailed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCreationFailedData {
    pub correlation_id: CorrelationId,
    /// Short diagnostic cause, not a stack trace.
    pub reason: String,
}

impl OnboardingEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            OnboardingEvent::OnboardingRequested(_) => "OnboardingRequested",
            OnboardingEvent::UserCreated(_) => "UserCreated",
            OnboardingEvent::GuestCreated(_) => "GuestCreated",
            OnboardingEvent::GuestCreationFailed(_) => "GuestCreationFailed",
        }
    }

    /// Returns the correlation ID routing this event to its saga instance.
    pub fn correlation_id(&self) -> CorrelationId {
        match self {
            OnboardingEvent::OnboardingRequested(data) => data.correlation_id,
            OnboardingEvent::UserCreated(data) => data.correlation_id,
            OnboardingEvent::GuestCreated(data) => data.correlation_id,
            OnboardingEvent::GuestCreationFailed(data) => data.correlation_id,
        }
    }
}

// Convenience constructors
impl OnboardingEvent {
    /// Creates an OnboardingRequested event.
    pub fn requested(
        correlation_id: CorrelationId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        OnboardingEvent::OnboardingRequested(OnboardingRequestedData {
            correlation_id,
            name: name.into(),
            email: email.into(),
        })
    }

    /// Creates a UserCreated event.
    pub fn user_created(
        correlation_id: CorrelationId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        OnboardingEvent::UserCreated(UserCreatedData {
            correlation_id,
            name: name.into(),
            email: email.into(),
        })
    }

    /// Creates a GuestCreated event.
    pub fn guest_created(correlation_id: CorrelationId) -> Self {
        OnboardingEvent::GuestCreated(GuestCreatedData { correlation_id })
    }

    /// Creates a GuestCreationFailed event.
    pub fn guest_creation_failed(
        correlation_id: CorrelationId,
        reason: impl Into<String>,
    ) -> Self {
        OnboardingEvent::GuestCreationFailed(GuestCreationFailedData {
            correlation_id,
            reason: reason.into(),
        })
    }
}
