use async_trait::async_trait;

use crate::{CorrelationId, InstanceRecord, Result, Version};

/// Default retention window for saga instances, in seconds.
///
/// After this long without a write, a record may be purged by the store
/// regardless of whether the saga completed.
pub const DEFAULT_RETENTION_SECS: i64 = 600;

/// Options for writing a saga instance record.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Expected current version of the record for optimistic concurrency
    /// control. If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl PutOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the record to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the record to not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for saga instance store implementations.
///
/// A saga store holds at most one record per correlation ID and supports
/// conditional write-if-unchanged, which is what serializes concurrent
/// transitions for the same saga. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait SagaStore: Send + Sync {
    /// Retrieves the record for a correlation ID.
    ///
    /// Returns None if no record exists or the record has expired.
    async fn get(&self, correlation_id: CorrelationId) -> Result<Option<InstanceRecord>>;

    /// Writes a record, conditionally on the expected prior version.
    ///
    /// If `options.expected_version` is set and does not match the current
    /// version (`Version::initial()` when no record exists), the operation
    /// fails with `SagaStoreError::Conflict` and nothing is written.
    ///
    /// Returns the version the record was written at.
    async fn put(&self, record: InstanceRecord, options: PutOptions) -> Result<Version>;

    /// Removes expired records, returning how many were purged.
    ///
    /// Stores may additionally drop expired records lazily on read.
    async fn purge_expired(&self) -> Result<u64>;
}
