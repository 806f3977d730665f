//! The saga orchestrator: sole writer of saga instance state.

use common::CorrelationId;
use futures_util::StreamExt;
use messaging::{EventBus, MessageStream, OnboardingEvent};
use saga_store::{InstanceRecord, PutOptions, SagaStore, SagaStoreError, Version};

use crate::error::SagaError;
use crate::instance::SagaInstance;
use crate::state::SagaState;
use crate::transition::{Outcome, evaluate};

/// Drives onboarding sagas by reacting to bus events.
///
/// Each delivery runs one read-transition-write cycle against the instance
/// store. Writes are conditional on the version that was read; a losing
/// writer re-reads and re-evaluates instead of overwriting newer state, so
/// concurrent deliveries for one correlation ID serialize. Outgoing events
/// are published only after the transition is persisted.
#[derive(Clone)]
pub struct SagaOrchestrator<B, S>
where
    B: EventBus + Clone,
    S: SagaStore + Clone,
{
    bus: B,
    store: S,
}

impl<B, S> SagaOrchestrator<B, S>
where
    B: EventBus + Clone + Send + Sync + 'static,
    S: SagaStore + Clone + Send + Sync + 'static,
{
    /// Creates a new orchestrator over the given bus and store.
    pub fn new(bus: B, store: S) -> Self {
        Self { bus, store }
    }

    /// Processes one event delivery.
    ///
    /// Safe to re-execute with identical input: redelivered and stale
    /// events are consumed without effect.
    #[tracing::instrument(
        skip(self, event),
        fields(event_type = event.event_type(), correlation_id = %event.correlation_id())
    )]
    pub async fn handle_event(&self, event: &OnboardingEvent) -> Result<(), SagaError> {
        let correlation_id = event.correlation_id();

        loop {
            let current = self.store.get(correlation_id).await?;
            let version = current
                .as_ref()
                .map(|record| record.version)
                .unwrap_or(Version::initial());
            let instance: Option<SagaInstance> = match &current {
                Some(record) => Some(record.instance()?),
                None => None,
            };

            match evaluate(instance.as_ref(), event) {
                Outcome::Ignored(reason) => {
                    metrics::counter!("saga_events_ignored_total").increment(1);
                    tracing::debug!(reason = reason.as_str(), "event consumed without effect");
                    return Ok(());
                }
                Outcome::Transitioned { instance, publish } => {
                    let record = InstanceRecord::new(
                        correlation_id,
                        version.next(),
                        serde_json::to_value(&instance)?,
                    );
                    let options = if version == Version::initial() {
                        PutOptions::expect_new()
                    } else {
                        PutOptions::expect_version(version)
                    };

                    match self.store.put(record, options).await {
                        Ok(_) => {
                            self.observe_transition(&instance);
                            for outgoing in publish {
                                self.bus.publish(outgoing).await?;
                            }
                            return Ok(());
                        }
                        Err(SagaStoreError::Conflict { .. }) => {
                            metrics::counter!("saga_store_conflicts_total").increment(1);
                            tracing::debug!("lost conditional write, retrying transition");
                            continue;
                        }
                        Err(error) => return Err(error.into()),
                    }
                }
            }
        }
    }

    /// Loads the instance for a correlation ID, with its stored version.
    pub async fn get_instance(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<(SagaInstance, Version)>, SagaError> {
        match self.store.get(correlation_id).await? {
            Some(record) => Ok(Some((record.instance()?, record.version))),
            None => Ok(None),
        }
    }

    /// Subscribes to the bus and processes events until it closes.
    pub async fn run(self) -> Result<(), SagaError> {
        let events = self.bus.subscribe().await?;
        self.pump(events).await;
        Ok(())
    }

    /// Subscribes to the bus, then processes events on a background task.
    ///
    /// The subscription is opened before this returns, so events published
    /// afterwards are guaranteed to be seen.
    pub async fn spawn(self) -> Result<tokio::task::JoinHandle<()>, SagaError> {
        let events = self.bus.subscribe().await?;
        Ok(tokio::spawn(async move { self.pump(events).await }))
    }

    async fn pump(self, mut events: MessageStream) {
        while let Some(event) = events.next().await {
            // The user-created fact is addressed to creation consumers.
            if matches!(event, OnboardingEvent::UserCreated(_)) {
                continue;
            }

            if let Err(error) = self.handle_event(&event).await {
                metrics::counter!("saga_handler_errors_total").increment(1);
                tracing::error!(
                    %error,
                    event_type = event.event_type(),
                    correlation_id = %event.correlation_id(),
                    "failed to process event, leaving it to redelivery"
                );
            }
        }

        tracing::info!("event stream closed, orchestrator stopping");
    }

    fn observe_transition(&self, instance: &SagaInstance) {
        match instance.state() {
            SagaState::GuestCreating => {
                metrics::counter!("saga_started_total").increment(1);
                tracing::info!("saga started, awaiting guest creation");
            }
            SagaState::Completed => {
                metrics::counter!("saga_completed_total").increment(1);
                tracing::info!("saga completed");
            }
            SagaState::Failed => {
                metrics::counter!("saga_failed_total").increment(1);
                tracing::warn!(
                    reason = instance.failure_reason().unwrap_or("unknown"),
                    "saga failed"
                );
            }
        }
    }
}
