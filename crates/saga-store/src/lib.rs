//! Durable keyed store for saga instances.
//!
//! Instances are stored one per correlation ID as a JSON payload with a
//! version counter. All writes are conditional on the expected prior
//! version, giving the per-correlation serialization the orchestrator
//! relies on. Records expire after a retention window; expiry is
//! operational cleanup, not a program-level delete.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::CorrelationId;
pub use error::{Result, SagaStoreError};
pub use memory::InMemorySagaStore;
pub use postgres::PostgresSagaStore;
pub use record::{InstanceRecord, Version};
pub use store::{DEFAULT_RETENTION_SECS, PutOptions, SagaStore};
