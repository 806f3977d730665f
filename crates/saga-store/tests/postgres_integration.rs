//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container and run serially because
//! each test truncates the table.

use std::sync::Arc;

use chrono::{Duration, Utc};
use saga_store::{
    CorrelationId, InstanceRecord, PostgresSagaStore, PutOptions, SagaStore, SagaStoreError,
    Version,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_saga_instances.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared table
async fn get_test_store() -> PostgresSagaStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE saga_instances")
        .execute(&pool)
        .await
        .unwrap();

    PostgresSagaStore::new(pool)
}

fn make_record(correlation_id: CorrelationId, version: Version) -> InstanceRecord {
    InstanceRecord::new(
        correlation_id,
        version,
        serde_json::json!({
            "correlationId": correlation_id.to_string(),
            "state": "GuestCreating",
            "userCreated": true,
            "guestCreated": false,
            "retryCount": 0
        }),
    )
}

#[tokio::test]
#[serial]
async fn put_and_get_roundtrip() {
    let store = get_test_store().await;
    let cid = CorrelationId::new();

    let version = store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await
        .unwrap();
    assert_eq!(version, Version::first());

    let stored = store.get(cid).await.unwrap().unwrap();
    assert_eq!(stored.correlation_id, cid);
    assert_eq!(stored.version, Version::first());
    assert_eq!(stored.payload["state"], "GuestCreating");
}

#[tokio::test]
#[serial]
async fn get_unknown_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(CorrelationId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn expect_new_conflicts_when_row_exists() {
    let store = get_test_store().await;
    let cid = CorrelationId::new();

    store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await
        .unwrap();

    let result = store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await;

    assert!(matches!(
        result,
        Err(SagaStoreError::Conflict { expected, actual, .. })
            if expected == Version::initial() && actual == Version::first()
    ));
}

#[tokio::test]
#[serial]
async fn conditional_update_succeeds_on_matching_version() {
    let store = get_test_store().await;
    let cid = CorrelationId::new();

    store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await
        .unwrap();

    let version = store
        .put(
            make_record(cid, Version::new(2)),
            PutOptions::expect_version(Version::first()),
        )
        .await
        .unwrap();
    assert_eq!(version, Version::new(2));
}

#[tokio::test]
#[serial]
async fn conditional_update_conflicts_on_stale_version() {
    let store = get_test_store().await;
    let cid = CorrelationId::new();

    store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await
        .unwrap();
    store
        .put(
            make_record(cid, Version::new(2)),
            PutOptions::expect_version(Version::first()),
        )
        .await
        .unwrap();

    let result = store
        .put(
            make_record(cid, Version::new(2)),
            PutOptions::expect_version(Version::first()),
        )
        .await;
    assert!(matches!(result, Err(SagaStoreError::Conflict { .. })));

    let stored = store.get(cid).await.unwrap().unwrap();
    assert_eq!(stored.version, Version::new(2));
}

#[tokio::test]
#[serial]
async fn expired_rows_are_invisible_and_purgeable() {
    let store = get_test_store().await;
    let cid = CorrelationId::new();

    let mut stale = make_record(cid, Version::first());
    stale.updated_at = Utc::now() - Duration::seconds(3600);
    store.put(stale, PutOptions::new()).await.unwrap();

    // Past the 10-minute retention, the row no longer reads back.
    assert!(store.get(cid).await.unwrap().is_none());

    // An expired row counts as absent for a conditional create.
    store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await
        .unwrap();
    assert!(store.get(cid).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn purge_expired_deletes_only_expired_rows() {
    let store = get_test_store().await;
    let cid_live = CorrelationId::new();
    let cid_dead = CorrelationId::new();

    store
        .put(make_record(cid_live, Version::first()), PutOptions::new())
        .await
        .unwrap();

    let mut stale = make_record(cid_dead, Version::first());
    stale.updated_at = Utc::now() - Duration::seconds(3600);
    store.put(stale, PutOptions::new()).await.unwrap();

    let purged = store.purge_expired().await.unwrap();
    assert_eq!(purged, 1);
    assert!(store.get(cid_live).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn concurrent_writers_serialize_to_one_winner() {
    let store = get_test_store().await;
    let cid = CorrelationId::new();

    store
        .put(make_record(cid, Version::first()), PutOptions::expect_new())
        .await
        .unwrap();

    let a = store.clone();
    let b = store.clone();
    let write_a = tokio::spawn(async move {
        a.put(
            make_record(cid, Version::new(2)),
            PutOptions::expect_version(Version::first()),
        )
        .await
    });
    let write_b = tokio::spawn(async move {
        b.put(
            make_record(cid, Version::new(2)),
            PutOptions::expect_version(Version::first()),
        )
        .await
    });

    let results = [write_a.await.unwrap(), write_b.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    let stored = store.get(cid).await.unwrap().unwrap();
    assert_eq!(stored.version, Version::new(2));
}
