//! Create-and-commit repository contracts and in-memory implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AccountsError;

/// A user record to persist.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// A guest record to persist.
#[derive(Debug, Clone)]
pub struct NewGuest {
    pub name: String,
    pub email: String,
}

/// Persistence contract for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a user as a single atomic unit of work (create + commit).
    ///
    /// Returns the ID of the stored record.
    async fn create(&self, user: NewUser) -> Result<Uuid, AccountsError>;
}

/// Persistence contract for guest records.
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Persists a guest as a single atomic unit of work (create + commit).
    ///
    /// Returns the ID of the stored record.
    async fn create(&self, guest: NewGuest) -> Result<Uuid, AccountsError>;
}

#[derive(Debug)]
struct InMemoryAccountsState<T> {
    records: HashMap<Uuid, T>,
    fail_on_create: bool,
}

impl<T> Default for InMemoryAccountsState<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            fail_on_create: false,
        }
    }
}

/// In-memory user repository for testing.
///
/// Enforces a unique-email constraint, as the real table does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryAccountsState<NewUser>>>,
}

impl InMemoryUserRepository {
    /// Creates a new in-memory user repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every create call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Returns the number of stored users.
    pub fn user_count(&self) -> usize {
        self.state.read().unwrap().records.len()
    }

    /// Returns true if a user exists with the given email.
    pub fn has_email(&self, email: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .records
            .values()
            .any(|u| u.email == email)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<Uuid, AccountsError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(AccountsError::Storage("storage offline".to_string()));
        }

        if state.records.values().any(|u| u.email == user.email) {
            return Err(AccountsError::DuplicateEmail(user.email));
        }

        let id = Uuid::new_v4();
        state.records.insert(id, user);
        Ok(id)
    }
}

/// In-memory guest repository for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGuestRepository {
    state: Arc<RwLock<InMemoryAccountsState<NewGuest>>>,
}

impl InMemoryGuestRepository {
    /// Creates a new in-memory guest repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every create call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Returns the number of stored guests.
    pub fn guest_count(&self) -> usize {
        self.state.read().unwrap().records.len()
    }

    /// Returns true if a guest exists with the given email.
    pub fn has_email(&self, email: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .records
            .values()
            .any(|g| g.email == email)
    }
}

#[async_trait]
impl GuestRepository for InMemoryGuestRepository {
    async fn create(&self, guest: NewGuest) -> Result<Uuid, AccountsError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(AccountsError::Storage("storage offline".to_string()));
        }

        if state.records.values().any(|g| g.email == guest.email) {
            return Err(AccountsError::DuplicateEmail(guest.email));
        }

        let id = Uuid::new_v4();
        state.records.insert(id, guest);
        Ok(id)
    }
}
