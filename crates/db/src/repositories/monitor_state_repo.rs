//! Repository for the `monitor_state` key/value table.

use async_trait::async_trait;
use millguard_core::types::Timestamp;
use sqlx::PgPool;

use crate::store::{decode_timestamp, encode_timestamp, StateKey, StateStore, StoreError};

/// Provides query operations for monitor state keys.
pub struct MonitorStateRepo;

impl MonitorStateRepo {
    /// Fetch the raw encoded value for a key.
    pub async fn find(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM monitor_state WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert a key only if it does not exist yet. Returns `true` if inserted.
    pub async fn insert_if_absent(pool: &PgPool, key: &str, value: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO monitor_state (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Replace a key's value only if it still holds `expected`. Returns `true` if updated.
    pub async fn update_if_matches(
        pool: &PgPool,
        key: &str,
        expected: &str,
        value: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE monitor_state SET value = $3, updated_at = now() \
             WHERE key = $1 AND value = $2",
        )
        .bind(key)
        .bind(expected)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Insert or overwrite a key.
    pub async fn upsert(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO monitor_state (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a key. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM monitor_state WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// [`StateStore`] backed by the `monitor_state` table.
///
/// Each compare-and-set is a single conditional statement, so concurrent
/// monitor processes sharing one database get at most one winner per key.
#[derive(Debug, Clone)]
pub struct PgStateStore {
    pool: PgPool,
}

impl PgStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    async fn get(&self, key: &StateKey) -> Result<Option<Timestamp>, StoreError> {
        MonitorStateRepo::find(&self.pool, &key.to_string())
            .await?
            .map(|raw| decode_timestamp(key, &raw))
            .transpose()
    }

    async fn compare_and_set(
        &self,
        key: &StateKey,
        expected: Option<Timestamp>,
        new: Timestamp,
    ) -> Result<bool, StoreError> {
        let name = key.to_string();
        let new = encode_timestamp(new);
        let swapped = match expected {
            None => MonitorStateRepo::insert_if_absent(&self.pool, &name, &new).await?,
            Some(old) => {
                MonitorStateRepo::update_if_matches(&self.pool, &name, &encode_timestamp(old), &new)
                    .await?
            }
        };
        if !swapped {
            tracing::debug!(key = %name, "Compare-and-set lost to a concurrent writer");
        }
        Ok(swapped)
    }

    async fn put(&self, key: &StateKey, value: Timestamp) -> Result<(), StoreError> {
        MonitorStateRepo::upsert(&self.pool, &key.to_string(), &encode_timestamp(value)).await?;
        Ok(())
    }

    async fn remove(&self, key: &StateKey) -> Result<(), StoreError> {
        MonitorStateRepo::delete(&self.pool, &key.to_string()).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
