use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    CorrelationId, InstanceRecord, Result, SagaStoreError, Version,
    store::{DEFAULT_RETENTION_SECS, PutOptions, SagaStore},
};

/// In-memory saga instance store for testing and single-process use.
///
/// Provides the same conditional-write and expiry semantics as the
/// PostgreSQL implementation. Expired records are dropped lazily on read
/// and eagerly by `purge_expired`.
#[derive(Clone)]
pub struct InMemorySagaStore {
    records: Arc<RwLock<HashMap<CorrelationId, InstanceRecord>>>,
    retention: Duration,
}

impl InMemorySagaStore {
    /// Creates a new empty store with the default 10-minute retention.
    pub fn new() -> Self {
        Self::with_retention(Duration::seconds(DEFAULT_RETENTION_SECS))
    }

    /// Creates a new empty store with an explicit retention window.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    /// Returns the number of unexpired records in the store.
    pub async fn record_count(&self) -> usize {
        let now = Utc::now();
        let records = self.records.read().await;
        records
            .values()
            .filter(|r| r.updated_at + self.retention > now)
            .count()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    fn is_expired(&self, record: &InstanceRecord) -> bool {
        record.updated_at + self.retention <= Utc::now()
    }
}

impl Default for InMemorySagaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SagaStore for InMemorySagaStore {
    async fn get(&self, correlation_id: CorrelationId) -> Result<Option<InstanceRecord>> {
        let mut records = self.records.write().await;

        if let Some(record) = records.get(&correlation_id)
            && self.is_expired(record)
        {
            records.remove(&correlation_id);
            return Ok(None);
        }

        Ok(records.get(&correlation_id).cloned())
    }

    async fn put(&self, record: InstanceRecord, options: PutOptions) -> Result<Version> {
        let mut records = self.records.write().await;

        let current_version = records
            .get(&record.correlation_id)
            .filter(|r| !self.is_expired(r))
            .map(|r| r.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(SagaStoreError::Conflict {
                correlation_id: record.correlation_id,
                expected,
                actual: current_version,
            });
        }

        let version = record.version;
        records.insert(record.correlation_id, record);
        Ok(version)
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.updated_at + self.retention > now);

        let purged = (before - records.len()) as u64;
        if purged > 0 {
            tracing::debug!(purged, "dropped expired saga instances");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(correlation_id: CorrelationId, version: Version) -> InstanceRecord {
        InstanceRecord::new(
            correlation_id,
            version,
            serde_json::json!({"state": "GuestCreating"}),
        )
    }

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let store = InMemorySagaStore::new();
        let cid = CorrelationId::new();

        let version = store
            .put(record(cid, Version::first()), PutOptions::expect_new())
            .await
            .unwrap();
        assert_eq!(version, Version::first());

        let stored = store.get(cid).await.unwrap().unwrap();
        assert_eq!(stored.correlation_id, cid);
        assert_eq!(stored.version, Version::first());
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let store = InMemorySagaStore::new();
        assert!(store.get(CorrelationId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expect_new_conflicts_when_record_exists() {
        let store = InMemorySagaStore::new();
        let cid = CorrelationId::new();

        store
            .put(record(cid, Version::first()), PutOptions::expect_new())
            .await
            .unwrap();

        let result = store
            .put(record(cid, Version::first()), PutOptions::expect_new())
            .await;

        assert!(matches!(
            result,
            Err(SagaStoreError::Conflict { expected, actual, .. })
                if expected == Version::initial() && actual == Version::first()
        ));
    }

    #[tokio::test]
    async fn conditional_update_succeeds_on_matching_version() {
        let store = InMemorySagaStore::new();
        let cid = CorrelationId::new();

        store
            .put(record(cid, Version::first()), PutOptions::expect_new())
            .await
            .unwrap();

        let version = store
            .put(
                record(cid, Version::new(2)),
                PutOptions::expect_version(Version::first()),
            )
            .await
            .unwrap();
        assert_eq!(version, Version::new(2));
    }

    #[tokio::test]
    async fn conditional_update_conflicts_on_stale_version() {
        let store = InMemorySagaStore::new();
        let cid = CorrelationId::new();

        store
            .put(record(cid, Version::first()), PutOptions::expect_new())
            .await
            .unwrap();
        store
            .put(
                record(cid, Version::new(2)),
                PutOptions::expect_version(Version::first()),
            )
            .await
            .unwrap();

        // A writer that read version 1 must lose.
        let result = store
            .put(
                record(cid, Version::new(2)),
                PutOptions::expect_version(Version::first()),
            )
            .await;

        assert!(matches!(result, Err(SagaStoreError::Conflict { .. })));

        // The newer state is untouched.
        let stored = store.get(cid).await.unwrap().unwrap();
        assert_eq!(stored.version, Version::new(2));
    }

    #[tokio::test]
    async fn unconditional_put_skips_version_check() {
        let store = InMemorySagaStore::new();
        let cid = CorrelationId::new();

        store
            .put(record(cid, Version::first()), PutOptions::new())
            .await
            .unwrap();
        store
            .put(record(cid, Version::new(5)), PutOptions::new())
            .await
            .unwrap();

        let stored = store.get(cid).await.unwrap().unwrap();
        assert_eq!(stored.version, Version::new(5));
    }

    #[tokio::test]
    async fn expired_records_are_dropped_on_read() {
        let store = InMemorySagaStore::with_retention(Duration::milliseconds(-1));
        let cid = CorrelationId::new();

        store
            .put(record(cid, Version::first()), PutOptions::new())
            .await
            .unwrap();

        assert!(store.get(cid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_record_does_not_block_a_new_instance() {
        let store = InMemorySagaStore::with_retention(Duration::milliseconds(-1));
        let cid = CorrelationId::new();

        store
            .put(record(cid, Version::first()), PutOptions::new())
            .await
            .unwrap();

        // The expired record counts as absent for the version check.
        let version = store
            .put(record(cid, Version::first()), PutOptions::expect_new())
            .await
            .unwrap();
        assert_eq!(version, Version::first());
    }

    #[tokio::test]
    async fn purge_expired_removes_only_expired_records() {
        let store = InMemorySagaStore::with_retention(Duration::seconds(DEFAULT_RETENTION_SECS));
        let cid_live = CorrelationId::new();
        let cid_dead = CorrelationId::new();

        store
            .put(record(cid_live, Version::first()), PutOptions::new())
            .await
            .unwrap();

        let mut stale = record(cid_dead, Version::first());
        stale.updated_at = Utc::now() - Duration::seconds(DEFAULT_RETENTION_SECS + 1);
        store.put(stale, PutOptions::new()).await.unwrap();

        let purged = store.purge_expired().await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(store.record_count().await, 1);
        assert!(store.get(cid_live).await.unwrap().is_some());
    }
}
