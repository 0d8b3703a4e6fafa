//! Millguard state persistence.
//!
//! - [`StateStore`] is the port the monitor depends on: a durable
//!   key-to-timestamp mapping with an atomic compare-and-set.
//! - [`InMemoryStateStore`] serves tests and single-process deployments.
//! - [`PgStateStore`] persists the same keys in PostgreSQL.

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod repositories;
pub mod store;

pub use memory::InMemoryStateStore;
pub use repositories::PgStateStore;
pub use store::{decode_timestamp, encode_timestamp, StateKey, StateStore, StoreError};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
