//! User creation: the entry point of the onboarding workflow.

use common::CorrelationId;
use messaging::{EventBus, OnboardingEvent};

use crate::error::AccountsError;
use crate::repository::{NewUser, UserRepository};

/// Command to create a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

impl CreateUser {
    /// Creates a new create-user command.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Persists users and starts an onboarding workflow for each.
///
/// The order is persist-then-publish: the start event only goes out after
/// the user record is committed, so a workflow can never reference a user
/// that does not exist. A persistence failure is returned to the caller
/// and no event is published.
pub struct UserCreationHandler<R, B>
where
    R: UserRepository,
    B: EventBus,
{
    repository: R,
    bus: B,
}

impl<R, B> UserCreationHandler<R, B>
where
    R: UserRepository,
    B: EventBus,
{
    /// Creates a new handler over the given repository and bus.
    pub fn new(repository: R, bus: B) -> Self {
        Self { repository, bus }
    }

    /// Creates a user and requests its onboarding workflow.
    ///
    /// Returns the freshly minted correlation ID; any failure past this
    /// call is asynchronous and invisible to the caller.
    #[tracing::instrument(skip(self, command), fields(email = %command.email))]
    pub async fn create_user(&self, command: CreateUser) -> Result<CorrelationId, AccountsError> {
        let user_id = self
            .repository
            .create(NewUser {
                name: command.name.clone(),
                email: command.email.clone(),
            })
            .await?;

        let correlation_id = CorrelationId::new();
        self.bus
            .publish(OnboardingEvent::requested(
                correlation_id,
                command.name,
                command.email,
            ))
            .await?;

        metrics::counter!("users_created_total").increment(1);
        tracing::info!(%user_id, %correlation_id, "user created, onboarding requested");

        Ok(correlation_id)
    }
}
