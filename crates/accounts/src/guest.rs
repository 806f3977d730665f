//! Guest provisioning: the downstream half of the onboarding workflow.

use futures_util::StreamExt;
use messaging::{EventBus, MessageStream, OnboardingEvent, UserCreatedData};

use crate::error::AccountsError;
use crate::repository::{GuestRepository, NewGuest};

/// Consumes user-created facts and creates the matching guest records.
///
/// Every consumed fact is answered on the bus: a created guest publishes
/// the success signal, any creation failure publishes the failure signal
/// with a short diagnostic reason. The failure signal is the only thing
/// that unblocks the waiting saga, so it goes out for every failed create.
#[derive(Clone)]
pub struct GuestProvisioner<R, B>
where
    R: GuestRepository + Clone,
    B: EventBus + Clone,
{
    repository: R,
    bus: B,
}

impl<R, B> GuestProvisioner<R, B>
where
    R: GuestRepository + Clone + Send + Sync + 'static,
    B: EventBus + Clone + Send + Sync + 'static,
{
    /// Creates a new provisioner over the given repository and bus.
    pub fn new(repository: R, bus: B) -> Self {
        Self { repository, bus }
    }

    /// Handles one user-created fact.
    ///
    /// The guest create is a single atomic unit of work; its outcome is
    /// reported on the bus either way.
    #[tracing::instrument(skip(self, data), fields(correlation_id = %data.correlation_id))]
    pub async fn handle_user_created(&self, data: &UserCreatedData) -> Result<(), AccountsError> {
        match self
            .repository
            .create(NewGuest {
                name: data.name.clone(),
                email: data.email.clone(),
            })
            .await
        {
            Ok(guest_id) => {
                metrics::counter!("guests_provisioned_total").increment(1);
                tracing::info!(%guest_id, "guest created");
                self.bus
                    .publish(OnboardingEvent::guest_created(data.correlation_id))
                    .await?;
            }
            Err(error) => {
                metrics::counter!("guest_provision_failures_total").increment(1);
                tracing::warn!(%error, "guest creation failed");
                self.bus
                    .publish(OnboardingEvent::guest_creation_failed(
                        data.correlation_id,
                        error.to_string(),
                    ))
                    .await?;
            }
        }

        Ok(())
    }

    /// Subscribes to the bus and processes facts until it closes.
    pub async fn run(self) -> Result<(), AccountsError> {
        let events = self.bus.subscribe().await?;
        self.pump(events).await;
        Ok(())
    }

    /// Subscribes to the bus, then processes facts on a background task.
    ///
    /// The subscription is opened before this returns, so events published
    /// afterwards are guaranteed to be seen.
    pub async fn spawn(self) -> Result<tokio::task::JoinHandle<()>, AccountsError> {
        let events = self.bus.subscribe().await?;
        Ok(tokio::spawn(async move { self.pump(events).await }))
    }

    async fn pump(self, mut events: MessageStream) {
        while let Some(event) = events.next().await {
            let OnboardingEvent::UserCreated(data) = event else {
                continue;
            };

            if let Err(error) = self.handle_user_created(&data).await {
                tracing::error!(
                    %error,
                    correlation_id = %data.correlation_id,
                    "failed to process user-created fact, leaving it to redelivery"
                );
            }
        }

        tracing::info!("event stream closed, guest provisioner stopping");
    }
}
