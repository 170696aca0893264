//! Embedded schema migrations for the chunk store.
//!
//! Applied versions are recorded in `schema_migrations`; each migration runs
//! in its own transaction together with its bookkeeping row.

use sqlx::{Executor, SqlitePool};
use thiserror::Error;

use crate::domain::errors::StorageError;

/// Failures while applying schema migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Migration `version` failed and was rolled back.
    #[error("Migration {version} failed: {source}")]
    Apply {
        /// Version that failed.
        version: i64,
        /// Underlying failure.
        #[source]
        source: sqlx::Error,
    },
    /// The `schema_migrations` table could not be read or written.
    #[error("Could not read or create schema_migrations: {0}")]
    Bookkeeping(#[source] sqlx::Error),
}

impl From<MigrationError> for StorageError {
    fn from(err: MigrationError) -> Self {
        Self::Migration(err.to_string())
    }
}

/// One versioned schema script.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Monotonic schema version.
    pub version: i64,
    /// Short human-readable summary.
    pub description: &'static str,
    /// SQL executed inside one transaction.
    pub sql: &'static str,
}

const EMBEDDED: &[Migration] = &[Migration {
    version: 1,
    description: "chunk store schema",
    sql: include_str!("../../../migrations/001_initial_schema.sql"),
}];

/// Migrations compiled into the binary, in version order.
pub const fn all_embedded_migrations() -> &'static [Migration] {
    EMBEDDED
}

/// Applies pending migrations and records them in `schema_migrations`.
pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    /// Create a migrator over `pool`.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every migration newer than the recorded schema version, in
    /// version order. Returns how many were applied.
    pub async fn run_embedded_migrations(&self, migrations: &[Migration]) -> Result<usize, MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(MigrationError::Bookkeeping)?;

        let current = self.current_version().await?;
        let mut pending: Vec<&Migration> = migrations.iter().filter(|m| m.version > current).collect();
        pending.sort_by_key(|m| m.version);

        for migration in &pending {
            self.apply(migration).await?;
            tracing::debug!(version = migration.version, description = migration.description, "Applied migration");
        }

        Ok(pending.len())
    }

    /// Highest applied version, 0 for a fresh database.
    pub async fn current_version(&self) -> Result<i64, MigrationError> {
        let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(MigrationError::Bookkeeping)?;
        Ok(version)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        let failed = |source: sqlx::Error| MigrationError::Apply {
            version: migration.version,
            source,
        };

        let mut tx = self.pool.begin().await.map_err(failed)?;
        (&mut *tx).execute(migration.sql).await.map_err(failed)?;
        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)
    }
}
