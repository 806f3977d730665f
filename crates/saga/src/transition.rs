//! The transition table of the onboarding saga.
//!
//! Transitions are data, not dispatch: a single pure function maps
//! (current instance, incoming event) to the next instance plus the events
//! to publish, or to a typed reason for ignoring the delivery. This keeps
//! the whole table unit-testable without a broker or store.

use messaging::OnboardingEvent;

use crate::instance::SagaInstance;

/// Result of evaluating one event against one saga instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The event advanced the saga; persist `instance`, then publish.
    Transitioned {
        instance: SagaInstance,
        publish: Vec<OnboardingEvent>,
    },

    /// The event must be consumed without effect.
    Ignored(IgnoreReason),
}

/// Why an event was consumed without a transition.
///
/// Under at-least-once delivery every one of these is expected traffic,
/// not a defect; they are logged and counted but never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A start event was redelivered for an instance that already exists.
    DuplicateStart,

    /// A non-start event arrived for a correlation ID with no instance.
    UnknownCorrelation,

    /// A completion signal arrived after the instance reached a terminal
    /// state.
    AlreadyFinalized,

    /// The event is not addressed to the orchestrator.
    Unhandled,
}

impl IgnoreReason {
    /// Returns the reason as a string, for logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::DuplicateStart => "duplicate_start",
            IgnoreReason::UnknownCorrelation => "unknown_correlation",
            IgnoreReason::AlreadyFinalized => "already_finalized",
            IgnoreReason::Unhandled => "unhandled",
        }
    }
}

/// Evaluates one event against the current instance state.
///
/// Pure and deterministic; the caller owns persistence and publishing.
pub fn evaluate(current: Option<&SagaInstance>, event: &OnboardingEvent) -> Outcome {
    match (current, event) {
        // First delivery of a start event creates the instance and
        // broadcasts the user-created fact downstream.
        (None, OnboardingEvent::OnboardingRequested(data)) => Outcome::Transitioned {
            instance: SagaInstance::start(data.correlation_id),
            publish: vec![OnboardingEvent::user_created(
                data.correlation_id,
                data.name.clone(),
                data.email.clone(),
            )],
        },

        // A redelivered start must not re-publish the fact.
        (Some(_), OnboardingEvent::OnboardingRequested(_)) => {
            Outcome::Ignored(IgnoreReason::DuplicateStart)
        }

        // The orchestrator never creates state from a non-start event.
        (None, _) => Outcome::Ignored(IgnoreReason::UnknownCorrelation),

        (Some(instance), OnboardingEvent::GuestCreated(_)) => {
            if instance.state().is_terminal() {
                Outcome::Ignored(IgnoreReason::AlreadyFinalized)
            } else {
                let mut next = instance.clone();
                next.complete();
                Outcome::Transitioned {
                    instance: next,
                    publish: vec![],
                }
            }
        }

        (Some(instance), OnboardingEvent::GuestCreationFailed(data)) => {
            if instance.state().is_terminal() {
                Outcome::Ignored(IgnoreReason::AlreadyFinalized)
            } else {
                let mut next = instance.clone();
                next.fail(data.reason.clone());
                Outcome::Transitioned {
                    instance: next,
                    publish: vec![],
                }
            }
        }

        // The user-created fact is addressed to creation consumers.
        (Some(_), OnboardingEvent::UserCreated(_)) => Outcome::Ignored(IgnoreReason::Unhandled),
    }
}
