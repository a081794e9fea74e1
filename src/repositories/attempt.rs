// src/repositories/attempt.rs - Data access for per-client attempt windows
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::AttemptRecord;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepositoryTrait: Send + Sync {
    async fn find(&self, client_id: &str) -> Result<Option<AttemptRecord>>;

    /// Creates the record for a client seen for the first time. A concurrent
    /// insert for the same client wins silently.
    async fn insert(&self, record: &AttemptRecord) -> Result<()>;

    /// Overwrites count, window end and last attempt for `record.client_id`
    async fn update(&self, record: &AttemptRecord) -> Result<u64>;

    /// Deletes records whose window ended before `cutoff`
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

pub struct AttemptRepository {
    pool: PgPool,
}

impl AttemptRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl AttemptRepositoryTrait for AttemptRepository {
    async fn find(&self, client_id: &str) -> Result<Option<AttemptRecord>> {
        let record = sqlx::query_as::<_, AttemptRecord>(
            r#"
            SELECT client_id, attempt_count, reset_time, last_attempt
            FROM customer_attempts
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert(&self, record: &AttemptRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customer_attempts (client_id, attempt_count, reset_time, last_attempt)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (client_id) DO NOTHING
            "#,
        )
        .bind(&record.client_id)
        .bind(record.attempt_count)
        .bind(record.reset_time)
        .bind(record.last_attempt)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, record: &AttemptRecord) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE customer_attempts
            SET attempt_count = $1, reset_time = $2, last_attempt = $3
            WHERE client_id = $4
            "#,
        )
        .bind(record.attempt_count)
        .bind(record.reset_time)
        .bind(record.last_attempt)
        .bind(&record.client_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM customer_attempts WHERE reset_time < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
