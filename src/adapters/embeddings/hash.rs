//! Local feature-hashing embedding provider.
//!
//! Maps each lowercase alphanumeric token to a bucket with FNV-1a and
//! L2-normalizes the counts. Texts sharing words land close together, which
//! is enough for offline use and deterministic tests; it has no notion of
//! meaning beyond token overlap.

use async_trait::async_trait;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::ports::EmbeddingProvider;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Deterministic offline embedder that hashes words into fixed buckets.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    /// Create a hash embedder producing `dimension`-length vectors.
    pub fn new(dimension: usize) -> RagResult<Self> {
        if dimension == 0 {
            return Err(RagError::Configuration(
                "hash embedding dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = token
            .bytes()
            .fold(FNV_OFFSET, |acc, b| (acc ^ u64::from(b)).wrapping_mul(FNV_PRIME));
        (hash % self.dimension as u64) as usize
    }

    /// Embed synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(&token.to_lowercase())] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn max_batch_size(&self) -> usize {
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::chunk_store::cosine_distance;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashEmbeddingProvider::new(0).is_err());
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let provider = HashEmbeddingProvider::new(64).unwrap();
        let a = provider.embed_text("Paris is the capital of France");
        let b = provider.embed_text("Paris is the capital of France");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_ignored() {
        let provider = HashEmbeddingProvider::new(64).unwrap();
        assert_eq!(provider.embed_text("France?"), provider.embed_text("france"));
    }

    #[test]
    fn test_overlap_ranks_closer() {
        let provider = HashEmbeddingProvider::new(256).unwrap();
        let question = provider.embed_text("What is the capital of France?");
        let relevant = provider.embed_text("Paris is the capital of France");
        let unrelated = provider.embed_text("Bananas grow in tropical climates");

        assert!(cosine_distance(&question, &relevant) < cosine_distance(&question, &unrelated));
    }

    #[test]
    fn test_no_tokens_yields_zero_vector() {
        let provider = HashEmbeddingProvider::new(8).unwrap();
        assert!(provider.embed_text("?!").iter().all(|v| *v == 0.0));
    }
}
