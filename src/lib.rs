//! ragline - retrieval-augmented question answering over a SQLite embedding store
//!
//! Documents are split into sentence chunks, embedded and persisted with
//! their provenance. Questions are embedded, matched against stored chunks
//! by cosine distance, and answered by a generation model from the
//! assembled context.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the ports adapters implement
//! - **Service Layer** (`services`): Chunker, retriever, context assembler and orchestration
//! - **Adapters** (`adapters`): SQLite store, embedding and generation HTTP clients, text extraction
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ragline::adapters::embeddings::HashEmbeddingProvider;
//! use ragline::adapters::generation::GeminiGenerationProvider;
//! use ragline::adapters::sqlite::{create_migrated_test_pool, SqliteChunkStore};
//! use ragline::domain::models::GenerationConfig;
//! use ragline::services::RagService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteChunkStore::new(create_migrated_test_pool().await?));
//!     let embedder = Arc::new(HashEmbeddingProvider::new(256)?);
//!     let generator = Arc::new(GeminiGenerationProvider::new(
//!         GenerationConfig::default(),
//!         Duration::from_secs(60),
//!     )?);
//!     let service = RagService::new(store, embedder, generator);
//!     service.ingest("Paris is the capital of France.").await?;
//!     println!("{}", service.ask("What is the capital of France?").await?.answer);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{GenerationError, RagError, RagResult, StorageError};
pub use domain::models::{
    AnswerRequest, AnswerResponse, Chunk, ChunkId, Config, DocumentSummary, IngestReport, NewChunk,
    SimilarityResult, StatusReport,
};
pub use domain::ports::{ChunkStore, EmbeddingProvider, GenerationProvider, TextExtractor};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::RagService;
