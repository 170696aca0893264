//! OpenAI embedding provider adapter.
//!
//! Calls the `/embeddings` endpoint of OpenAI or any compatible server
//! (Azure OpenAI, local inference servers).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::EmbeddingConfig;
use crate::domain::ports::EmbeddingProvider;
use crate::infrastructure::logging::scrub_secrets;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI embedding provider.
pub struct OpenAiEmbeddingProvider {
    config: EmbeddingConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiEmbeddingProvider {
    /// Build a provider. The API key comes from the config or `OPENAI_API_KEY`.
    pub fn new(config: EmbeddingConfig, request_timeout: Duration) -> RagResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RagError::Configuration(format!(
                    "OpenAI API key not set. Set {API_KEY_ENV} or configure embedding.api_key."
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    async fn call_embeddings_api(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        let request_body = EmbeddingsRequest {
            model: &self.config.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RagError::Embedding(scrub_secrets(&format!("Embedding API request failed: {e}"))))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(RagError::Embedding(scrub_secrets(&format!(
                "Embedding API returned {status}: {body}"
            ))));
        }

        let result: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to parse embedding response: {e}")))?;

        if result.data.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "Embedding API returned {} vectors for {} inputs",
                result.data.len(),
                texts.len()
            )));
        }

        // Sort by index to maintain input order
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        let expected = self.config.dimension;
        data.into_iter()
            .map(|d| {
                if d.embedding.len() == expected {
                    Ok(d.embedding)
                } else {
                    Err(RagError::Embedding(format!(
                        "Embedding model returned {} dimensions, expected {expected}",
                        d.embedding.len()
                    )))
                }
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let results = self.call_embeddings_api(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.max_batch_size()) {
            vectors.extend(self.call_embeddings_api(batch).await?);
        }
        Ok(vectors)
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size.max(1)
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
