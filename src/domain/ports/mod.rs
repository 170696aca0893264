//! Port traits (hexagonal architecture).
//!
//! Services depend on these traits; the adapters module provides the
//! concrete implementations.

pub mod chunk_store;
pub mod embedding;
pub mod extraction;
pub mod generation;

pub use chunk_store::ChunkStore;
pub use embedding::EmbeddingProvider;
pub use extraction::TextExtractor;
pub use generation::GenerationProvider;
