//! Request/response models for the ingest, ask and status operations.

use serde::{Deserialize, Serialize};

use super::chunk::SimilarityResult;

/// A question to answer, with an optional retrieval depth override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Question text; trimmed before use.
    pub question: String,

    /// Number of chunks to retrieve; falls back to the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

impl AnswerRequest {
    /// Request for `question` with the default chunk count.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_n: None,
        }
    }

    /// Override the number of retrieved chunks.
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }
}

/// Generated answer plus the chunks that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Generated answer text.
    pub answer: String,
    /// Chunks used as context, nearest first.
    pub sources: Vec<SimilarityResult>,
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Id recorded on every stored chunk.
    pub document_id: String,
    /// Number of chunks persisted.
    pub chunks_stored: usize,
}

/// Store health summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Chunks in the store.
    pub total_chunks: u64,
    /// Distinct source documents.
    pub total_documents: usize,
    /// Established embedding dimensionality, `None` while the store is empty
    pub dimension: Option<usize>,
}
