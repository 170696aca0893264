//! Top-N retrieval over the chunk store.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::SimilarityResult;
use crate::domain::ports::ChunkStore;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_N: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

/// Finds the chunks nearest to a query embedding.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn ChunkStore>,
    default_top_n: NonZeroUsize,
}

impl Retriever {
    /// Retriever over `store` with the default chunk count.
    pub fn new(store: Arc<dyn ChunkStore>) -> Self {
        Self {
            store,
            default_top_n: DEFAULT_TOP_N,
        }
    }

    /// Change the chunk count used by `retrieve_default`.
    #[must_use]
    pub const fn with_default_top_n(mut self, top_n: NonZeroUsize) -> Self {
        self.default_top_n = top_n;
        self
    }

    /// Chunk count used by `retrieve_default`.
    pub const fn default_top_n(&self) -> usize {
        self.default_top_n.get()
    }

    /// Up to `n` chunks nearest to `embedding`, most similar first.
    pub async fn retrieve(&self, embedding: &[f32], n: usize) -> RagResult<Vec<SimilarityResult>> {
        let n = NonZeroUsize::new(n)
            .ok_or_else(|| RagError::InvalidInput("number of results must be at least 1".to_string()))?;

        let results = self.store.query_nearest(embedding, n).await?;
        debug!(top_n = n.get(), results = results.len(), "Retrieved chunks");
        Ok(results)
    }

    /// Retrieve with the default chunk count.
    pub async fn retrieve_default(&self, embedding: &[f32]) -> RagResult<Vec<SimilarityResult>> {
        self.retrieve(embedding, self.default_top_n.get()).await
    }
}
