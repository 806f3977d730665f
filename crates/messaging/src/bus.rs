use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use thiserror::Error;

use crate::events::OnboardingEvent;

/// Errors that can occur when interacting with the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The underlying transport rejected the operation.
    #[error("event bus unavailable: {0}")]
    Unavailable(String),
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// A stream of events delivered to one subscriber.
pub type MessageStream = Pin<Box<dyn Stream<Item = OnboardingEvent> + Send>>;

/// Publish/subscribe transport for onboarding events.
///
/// Delivery is at-least-once and fire-and-forget from the publisher's
/// perspective: a successful `publish` says nothing about downstream
/// processing. No ordering is guaranteed across different message types.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes an event to all active subscribers.
    ///
    /// Publishing with no subscribers attached is not an error.
    async fn publish(&self, event: OnboardingEvent) -> Result<()>;

    /// Opens a new subscription covering events published from now on.
    async fn subscribe(&self) -> Result<MessageStream>;
}
