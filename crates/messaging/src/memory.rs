use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::broadcast;

use crate::bus::{EventBus, MessageStream, Result};
use crate::events::OnboardingEvent;

/// Default broadcast channel capacity per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// In-memory event bus implementation for testing and single-process use.
///
/// Built on a tokio broadcast channel: every subscriber sees every event
/// published after it subscribed. A subscriber that falls more than the
/// channel capacity behind loses the oldest events, which is logged as a
/// warning and matches the weak delivery guarantees of the trait.
#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<OnboardingEvent>,
    published: Arc<AtomicU64>,
}

impl InMemoryEventBus {
    /// Creates a new bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new bus with an explicit per-subscriber capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the total number of events published on this bus.
    pub fn publish_count(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: OnboardingEvent) -> Result<()> {
        self.published.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(
            event_type = event.event_type(),
            correlation_id = %event.correlation_id(),
            "publishing event"
        );

        // send only fails when no receiver exists, which is fine for a
        // fire-and-forget publish.
        let _ = self.sender.send(event);
        Ok(())
    }

    async fn subscribe(&self) -> Result<MessageStream> {
        let receiver = self.sender.subscribe();

        let stream = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber lagged, dropping oldest events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
