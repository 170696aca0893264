//! Wiring from loaded configuration to a ready [`RagService`].

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::adapters::embeddings::{HashEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::adapters::generation::GeminiGenerationProvider;
use crate::adapters::sqlite::{initialize_from_config, SqliteChunkStore};
use crate::domain::errors::{GenerationError, RagResult};
use crate::domain::models::Config;
use crate::domain::ports::{ChunkStore, EmbeddingProvider, GenerationProvider};
use crate::infrastructure::config::ConfigLoader;
use crate::services::RagService;

/// Load configuration from `path` when given, otherwise from `.ragline/` and the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Process-wide handles for one CLI invocation.
pub struct AppContext {
    /// Loaded configuration.
    pub config: Config,
    pool: SqlitePool,
}

impl AppContext {
    /// Open and migrate the configured database.
    pub async fn open(config: Config) -> Result<Self> {
        let pool = initialize_from_config(&config.database)
            .await
            .context("Failed to initialize database. Run 'ragline init' first.")?;
        Ok(Self { config, pool })
    }

    /// Chunk store over the shared pool.
    pub fn store(&self) -> Arc<dyn ChunkStore> {
        Arc::new(SqliteChunkStore::new(self.pool.clone()))
    }

    /// Embedding provider selected by `embedding.provider`.
    pub fn embedder(&self) -> RagResult<Arc<dyn EmbeddingProvider>> {
        let embedding = &self.config.embedding;
        match embedding.provider.as_str() {
            "hash" => Ok(Arc::new(HashEmbeddingProvider::new(embedding.dimension)?)),
            _ => Ok(Arc::new(OpenAiEmbeddingProvider::new(
                embedding.clone(),
                self.config.timeouts.embedding(),
            )?)),
        }
    }

    /// Generation provider, or a placeholder that reports why it could not
    /// be built the first time it is asked to generate.
    pub fn generator(&self) -> Arc<dyn GenerationProvider> {
        match GeminiGenerationProvider::new(self.config.generation.clone(), self.config.timeouts.generation()) {
            Ok(provider) => Arc::new(provider),
            Err(err) => {
                debug!(error = %err, "generation provider unavailable");
                Arc::new(UnavailableGenerator { reason: err.to_string() })
            }
        }
    }

    /// Pipeline service wired from the configuration.
    pub fn rag_service(&self) -> Result<RagService> {
        let service = RagService::from_config(&self.config, self.store(), self.embedder()?, self.generator())?;
        Ok(service)
    }

    /// Close the pool so WAL contents are checkpointed before exit.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

struct UnavailableGenerator {
    reason: String,
}

#[async_trait]
impl GenerationProvider for UnavailableGenerator {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn generate(&self, _prompt: &str) -> RagResult<String> {
        Err(GenerationError::Configuration(self.reason.clone()).into())
    }
}
