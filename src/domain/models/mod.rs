//! Domain models for chunks, answers, and configuration.

pub mod answer;
pub mod chunk;
pub mod config;

pub use answer::{AnswerRequest, AnswerResponse, IngestReport, StatusReport};
pub use chunk::{Chunk, ChunkId, DocumentSummary, NewChunk, SimilarityResult};
pub use config::{
    ChunkingConfig, Config, DatabaseConfig, EmbeddingConfig, GenerationConfig, LoggingConfig,
    RetrievalConfig, TimeoutConfig,
};
