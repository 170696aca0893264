//! Embedding store port.
//!
//! A durable collection of chunks with nearest-neighbour lookup by cosine
//! distance. All vectors in one store share a single dimensionality, fixed
//! by the first insert.

use std::num::NonZeroUsize;

use async_trait::async_trait;

use crate::domain::errors::StorageError;
use crate::domain::models::{Chunk, ChunkId, DocumentSummary, NewChunk, SimilarityResult};

/// Persistent store of embedded chunks.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist one chunk and return its id.
    async fn insert(&self, chunk: NewChunk) -> Result<ChunkId, StorageError>;

    /// Persist chunks atomically, in order. Either every chunk is stored
    /// or none is.
    async fn insert_batch(&self, chunks: Vec<NewChunk>) -> Result<Vec<ChunkId>, StorageError>;

    /// Number of stored chunks.
    async fn count(&self) -> Result<u64, StorageError>;

    /// Dimensionality established by the first insert, if any.
    async fn dimension(&self) -> Result<Option<usize>, StorageError>;

    /// Up to `n` chunks ordered by ascending cosine distance to `embedding`.
    /// Ties keep insertion order.
    async fn query_nearest(
        &self,
        embedding: &[f32],
        n: NonZeroUsize,
    ) -> Result<Vec<SimilarityResult>, StorageError>;

    /// Documents that contributed chunks, oldest first.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, StorageError>;

    /// Chunks of one document in insertion order.
    async fn document_chunks(&self, document_id: &str) -> Result<Vec<Chunk>, StorageError>;
}
