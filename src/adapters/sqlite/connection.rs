//! SQLite connection pool for the chunk store.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::errors::StorageError;
use crate::domain::models::DatabaseConfig;

const MEMORY_URL: &str = "sqlite::memory:";

/// Failures opening or checking the SQLite pool.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The pool could not be built.
    #[error("Failed to open chunk database: {0}")]
    PoolCreationFailed(#[source] sqlx::Error),
    /// The URL is not a `sqlite:` URL.
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
    /// The database file's directory could not be created.
    #[error("Failed to create database directory: {0}")]
    DirectoryCreationFailed(#[source] std::io::Error),
    /// A query against an open pool failed.
    #[error("Database did not answer: {0}")]
    ConnectionFailed(#[source] sqlx::Error),
}

impl From<ConnectionError> for StorageError {
    fn from(err: ConnectionError) -> Self {
        Self::Connection(err.to_string())
    }
}

/// Pool sizing and wait limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long a caller waits for a free pooled connection.
    pub acquire_timeout: Duration,
    /// How long a connection waits on SQLite's write lock before `SQLITE_BUSY`.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, ConnectionError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|_| ConnectionError::InvalidDatabaseUrl(database_url.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);
    Ok(options)
}

/// Open a pool on `database_url`, creating the file and its directory if needed.
pub async fn create_pool(database_url: &str, config: Option<PoolConfig>) -> Result<SqlitePool, ConnectionError> {
    let config = config.unwrap_or_default();

    let options = connect_options(database_url)?
        .create_if_missing(true)
        .busy_timeout(config.busy_timeout);

    if let Some(path) = database_file_path(database_url) {
        ensure_parent_dir(path)?;
    }

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)
}

/// Single-connection in-memory pool; every call gets a fresh database.
pub async fn create_test_pool() -> Result<SqlitePool, ConnectionError> {
    let options = connect_options(MEMORY_URL)?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)
}

/// File path named by a `sqlite:` URL, or `None` for in-memory databases.
fn database_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = rest.split('?').next().unwrap_or(rest);

    (!path.is_empty() && path != ":memory:").then(|| Path::new(path))
}

fn ensure_parent_dir(path: &Path) -> Result<(), ConnectionError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(ConnectionError::DirectoryCreationFailed)
        }
        _ => Ok(()),
    }
}

/// Round-trip a trivial query through the pool.
pub async fn verify_connection(pool: &SqlitePool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
        .map_err(ConnectionError::ConnectionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("store.db");
        let url = format!("sqlite:{}", db_path.display());

        let pool = create_pool(&url, None).await.unwrap();
        verify_connection(&pool).await.unwrap();

        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = create_pool("postgres://localhost/db", None).await;
        assert!(matches!(result, Err(ConnectionError::InvalidDatabaseUrl(_))));
    }

    #[test]
    fn test_database_file_path() {
        assert_eq!(database_file_path("sqlite:.ragline/ragline.db"), Some(Path::new(".ragline/ragline.db")));
        assert_eq!(database_file_path("sqlite:///tmp/r.db?mode=rwc"), Some(Path::new("/tmp/r.db")));
        assert_eq!(database_file_path(MEMORY_URL), None);
    }

    #[test]
    fn test_pool_config_from_database_config() {
        let db = DatabaseConfig {
            max_connections: 0,
            acquire_timeout_secs: 2,
            ..DatabaseConfig::default()
        };
        let pool_config = PoolConfig::from(&db);
        assert_eq!(pool_config.max_connections, 1);
        assert_eq!(pool_config.acquire_timeout, Duration::from_secs(2));
        assert_eq!(PoolConfig::default().max_connections, 5);
    }
}
