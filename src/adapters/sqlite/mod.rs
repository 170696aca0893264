//! SQLite database adapters for the ragline embedding store.

pub mod chunk_store;
pub mod connection;
pub mod migrations;

pub use chunk_store::SqliteChunkStore;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::StorageError;
use crate::domain::models::DatabaseConfig;

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| StorageError::Corrupt(format!("invalid timestamp '{s}': {e}")))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Failures while bringing a database up.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Opening the pool failed.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    /// A follow-up query failed.
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

impl From<DatabaseError> for StorageError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(e) => e.into(),
            DatabaseError::Migration(e) => e.into(),
            DatabaseError::Query(e) => Self::Database(e),
        }
    }
}

/// Open `database_url` and apply every embedded migration.
pub async fn initialize_database(database_url: &str, config: Option<PoolConfig>) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Open (creating if needed) and migrate the database described by `config`.
pub async fn initialize_from_config(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    initialize_database(&config.url(), Some(PoolConfig::from(config))).await
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
