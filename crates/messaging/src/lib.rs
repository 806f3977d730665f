//! Event contracts and bus abstraction for the onboarding workflow.
//!
//! Services never call each other directly: the user service starts a
//! workflow by publishing [`OnboardingEvent::OnboardingRequested`], the
//! orchestrator broadcasts the user-created fact, and the guest service
//! answers with a success or failure signal. All messages carry the
//! correlation ID that keys the saga instance.

pub mod bus;
pub mod events;
pub mod memory;

pub use bus::{BusError, EventBus, MessageStream};
pub use events::{
    GuestCreatedData, GuestCreationFailedData, OnboardingEvent, OnboardingRequestedData,
    UserCreatedData,
};
pub use memory::InMemoryEventBus;
