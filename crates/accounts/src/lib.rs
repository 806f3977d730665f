//! User and guest creation services.
//!
//! Two sides of the onboarding workflow live here. The user-creation
//! handler persists a user and, only then, asks for a workflow by
//! publishing the start event. The guest provisioner consumes the
//! user-created fact and answers with a success or failure signal.
//! Both persist through the same create-and-commit repository contract.

pub mod error;
pub mod guest;
pub mod repository;
pub mod user;

pub use error::AccountsError;
pub use guest::GuestProvisioner;
pub use repository::{
    GuestRepository, InMemoryGuestRepository, InMemoryUserRepository, NewGuest, NewUser,
    UserRepository,
};
pub use user::{CreateUser, UserCreationHandler};
