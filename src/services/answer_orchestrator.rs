//! Answer orchestration: embed, retrieve, assemble, generate.
//!
//! Each step runs under its own timeout. Nothing is retried and nothing is
//! written to storage while answering.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::domain::errors::{GenerationError, RagError, RagResult, StorageError};
use crate::domain::models::{AnswerRequest, AnswerResponse, SimilarityResult, TimeoutConfig};
use crate::domain::ports::{EmbeddingProvider, GenerationProvider};
use crate::services::context_assembler::ContextAssembler;
use crate::services::retriever::Retriever;

/// Per-step time limits for the latency-bearing calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTimeouts {
    /// Query embedding limit.
    pub embedding: Duration,
    /// Nearest-chunk query limit.
    pub storage: Duration,
    /// Answer generation limit.
    pub generation: Duration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for StepTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            embedding: config.embedding(),
            storage: config.storage(),
            generation: config.generation(),
        }
    }
}

/// Build the generation prompt for a question and its assembled context.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!("Question: {question}\nContext: {context}\nAnswer:")
}

/// Run `fut` under `limit`, mapping expiry through `on_timeout`.
pub(crate) async fn with_timeout<T, F>(
    limit: Duration,
    fut: F,
    on_timeout: impl FnOnce(Duration) -> RagError,
) -> RagResult<T>
where
    F: Future<Output = RagResult<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(on_timeout(limit)))
}

pub(crate) fn embedding_timeout(limit: Duration) -> RagError {
    RagError::Embedding(format!("embedding timed out after {limit:?}"))
}

pub(crate) fn storage_timeout(limit: Duration) -> RagError {
    RagError::Storage(StorageError::Timeout(limit))
}

fn generation_timeout(limit: Duration) -> RagError {
    RagError::Generation(GenerationError::Timeout(limit))
}

/// Embed one text, rejecting empty vectors.
pub(crate) async fn embed_query(
    embedder: &dyn EmbeddingProvider,
    text: &str,
    limit: Duration,
) -> RagResult<Vec<f32>> {
    let embedding = with_timeout(limit, embedder.embed(text), embedding_timeout)
        .await
        .map_err(|err| match err {
            RagError::Embedding(_) => err,
            other => RagError::Embedding(other.to_string()),
        })?;

    if embedding.is_empty() {
        return Err(RagError::Embedding(format!(
            "{} returned an empty embedding",
            embedder.name()
        )));
    }
    Ok(embedding)
}

/// Runs one question through embed, retrieve, assemble, and generate.
pub struct AnswerOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    assembler: ContextAssembler,
    generator: Arc<dyn GenerationProvider>,
    timeouts: StepTimeouts,
}

impl AnswerOrchestrator {
    /// Build an orchestrator with default step timeouts.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: Retriever,
        assembler: ContextAssembler,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            embedder,
            retriever,
            assembler,
            generator,
            timeouts: StepTimeouts::default(),
        }
    }

    /// Replace the per-step timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: StepTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Retriever used for the retrieve step.
    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `question` and return the generated text unmodified.
    pub async fn answer(&self, question: &str) -> RagResult<String> {
        self.answer_request(AnswerRequest::new(question))
            .await
            .map(|response| response.answer)
    }

    /// Answer `request`, honoring its `top_n` override.
    #[instrument(skip_all, fields(top_n = request.top_n))]
    pub async fn answer_request(&self, request: AnswerRequest) -> RagResult<AnswerResponse> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("question cannot be empty".to_string()));
        }

        let embedding = embed_query(self.embedder.as_ref(), question, self.timeouts.embedding).await?;

        let top_n = request.top_n.unwrap_or_else(|| self.retriever.default_top_n());
        let sources = self.retrieve(&embedding, top_n).await?;

        let context = self.assembler.assemble(&sources);
        debug!(results = sources.len(), context_chars = context.chars().count(), "Assembled context");

        let prompt = build_prompt(question, &context);
        let answer = with_timeout(
            self.timeouts.generation,
            self.generator.generate(&prompt),
            generation_timeout,
        )
        .await?;

        info!(
            results = sources.len(),
            provider = self.generator.name(),
            answer_chars = answer.chars().count(),
            "Answered question"
        );
        Ok(AnswerResponse { answer, sources })
    }

    async fn retrieve(&self, embedding: &[f32], top_n: usize) -> RagResult<Vec<SimilarityResult>> {
        with_timeout(
            self.timeouts.storage,
            self.retriever.retrieve(embedding, top_n),
            storage_timeout,
        )
        .await
    }
}
