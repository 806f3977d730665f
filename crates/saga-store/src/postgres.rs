use async_trait::async_trait;
use chrono::Duration;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CorrelationId, InstanceRecord, Result, SagaStoreError, Version,
    store::{DEFAULT_RETENTION_SECS, PutOptions, SagaStore},
};

/// PostgreSQL-backed saga instance store.
///
/// One row per correlation ID. Conditional writes take a row lock on the
/// current version inside a transaction, so concurrent writers for the
/// same saga serialize and the loser sees a conflict. Rows carry an
/// `expires_at` column: reads filter expired rows and `purge_expired`
/// deletes them.
#[derive(Clone)]
pub struct PostgresSagaStore {
    pool: PgPool,
    retention: Duration,
}

impl PostgresSagaStore {
    /// Creates a new store with the default 10-minute retention.
    pub fn new(pool: PgPool) -> Self {
        Self::with_retention(pool, Duration::seconds(DEFAULT_RETENTION_SECS))
    }

    /// Creates a new store with an explicit retention window.
    pub fn with_retention(pool: PgPool, retention: Duration) -> Self {
        Self { pool, retention }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<InstanceRecord> {
        Ok(InstanceRecord {
            correlation_id: CorrelationId::from_uuid(row.try_get::<Uuid, _>("correlation_id")?),
            version: Version::new(row.try_get("version")?),
            payload: row.try_get("payload")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl SagaStore for PostgresSagaStore {
    async fn get(&self, correlation_id: CorrelationId) -> Result<Option<InstanceRecord>> {
        let row = sqlx::query(
            r#"
            SELECT correlation_id, version, payload, updated_at
            FROM saga_instances
            WHERE correlation_id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(correlation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn put(&self, record: InstanceRecord, options: PutOptions) -> Result<Version> {
        let expires_at = record.updated_at + self.retention;
        let mut tx = self.pool.begin().await?;

        let result = if let Some(expected) = options.expected_version {
            // Check the current version first, locking the row so a
            // concurrent writer for the same saga serializes behind us.
            let current: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT version
                FROM saga_instances
                WHERE correlation_id = $1 AND expires_at > NOW()
                FOR UPDATE
                "#,
            )
            .bind(record.correlation_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;

            let actual = Version::new(current.unwrap_or(0));
            if actual != expected {
                return Err(SagaStoreError::Conflict {
                    correlation_id: record.correlation_id,
                    expected,
                    actual,
                });
            }

            // The version guard on the upsert closes the remaining race:
            // two writers creating the same saga see no row to lock, and
            // only the first insert may win. An expired row counts as
            // absent and is overwritten in place.
            sqlx::query(
                r#"
                INSERT INTO saga_instances (correlation_id, payload, version, updated_at, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (correlation_id) DO UPDATE
                SET payload = EXCLUDED.payload,
                    version = EXCLUDED.version,
                    updated_at = EXCLUDED.updated_at,
                    expires_at = EXCLUDED.expires_at
                WHERE saga_instances.version = $6
                   OR saga_instances.expires_at <= NOW()
                "#,
            )
            .bind(record.correlation_id.as_uuid())
            .bind(&record.payload)
            .bind(record.version.as_i64())
            .bind(record.updated_at)
            .bind(expires_at)
            .bind(expected.as_i64())
            .execute(&mut *tx)
            .await?
        } else {
            sqlx::query(
                r#"
                INSERT INTO saga_instances (correlation_id, payload, version, updated_at, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (correlation_id) DO UPDATE
                SET payload = EXCLUDED.payload,
                    version = EXCLUDED.version,
                    updated_at = EXCLUDED.updated_at,
                    expires_at = EXCLUDED.expires_at
                "#,
            )
            .bind(record.correlation_id.as_uuid())
            .bind(&record.payload)
            .bind(record.version.as_i64())
            .bind(record.updated_at)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?
        };

        if let Some(expected) = options.expected_version
            && result.rows_affected() == 0
        {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM saga_instances WHERE correlation_id = $1")
                    .bind(record.correlation_id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(SagaStoreError::Conflict {
                correlation_id: record.correlation_id,
                expected,
                actual: Version::new(actual.unwrap_or(0)),
            });
        }

        tx.commit().await?;
        Ok(record.version)
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM saga_instances WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "dropped expired saga instances");
        }
        Ok(purged)
    }
}
