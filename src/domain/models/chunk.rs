//! Chunk domain models
//!
//! A chunk is a persisted unit of document text paired with its embedding.
//! These types are framework-agnostic; the SQLite adapter maps rows onto them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a chunk when it is persisted.
///
/// Identifiers are monotonic, so ordering by id is ordering by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub i64);

impl ChunkId {
    /// Raw row id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chunk waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    /// Trimmed, non-empty text
    pub text: String,

    /// Embedding vector for `text`
    pub embedding: Vec<f32>,

    /// Document this chunk was split from
    pub source_document_id: Option<String>,
}

impl NewChunk {
    /// Chunk with no document provenance.
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
            source_document_id: None,
        }
    }

    /// Attach the originating document id.
    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.source_document_id = Some(document_id.into());
        self
    }

    /// Embedding length.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// A persisted chunk. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Store-assigned id.
    pub id: ChunkId,

    /// Chunk text as ingested.
    pub text: String,

    /// Stored embedding.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,

    /// Document the chunk came from.
    pub source_document_id: Option<String>,

    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Embedding length.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// Result of a nearest-neighbour query: a chunk's text and its distance
/// to the query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Id of the matched chunk.
    pub chunk_id: ChunkId,

    /// Matched chunk text.
    pub text: String,

    /// Cosine distance (lower is more similar, 0 = same direction)
    pub distance: f32,

    /// Document the chunk came from.
    pub source_document_id: Option<String>,
}

impl SimilarityResult {
    /// Result without provenance.
    pub fn new(chunk_id: ChunkId, text: impl Into<String>, distance: f32) -> Self {
        Self {
            chunk_id,
            text: text.into(),
            distance,
            source_document_id: None,
        }
    }

    /// Cosine similarity, `1 - distance`.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Per-document provenance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document id shared by the chunks.
    pub document_id: String,
    /// Chunks stored for the document.
    pub chunk_count: u64,
    /// Lowest chunk id of the document.
    pub first_chunk_id: ChunkId,
    /// Earliest chunk insert time.
    pub created_at: DateTime<Utc>,
}
