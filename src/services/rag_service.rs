//! RAG (Retrieval-Augmented Generation) service
//!
//! The boundary of the pipeline. Ingestion runs extract, chunk, embed and
//! store; asking delegates to the [`AnswerOrchestrator`].

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::extraction::PlainTextExtractor;
use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{
    AnswerRequest, AnswerResponse, Config, DocumentSummary, IngestReport, NewChunk, SimilarityResult,
    StatusReport,
};
use crate::domain::ports::{ChunkStore, EmbeddingProvider, GenerationProvider, TextExtractor};
use crate::services::answer_orchestrator::{
    embed_query, embedding_timeout, storage_timeout, with_timeout, AnswerOrchestrator, StepTimeouts,
};
use crate::services::chunker::SentenceChunker;
use crate::services::context_assembler::{ContextAssembler, ContextPolicy};
use crate::services::retriever::Retriever;

/// RAG service for document ingestion and question answering
pub struct RagService {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn TextExtractor>,
    chunker: SentenceChunker,
    orchestrator: AnswerOrchestrator,
    timeouts: StepTimeouts,
}

impl RagService {
    /// Create a service with default chunking, retrieval and timeouts.
    pub fn new(
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self::build(
            store,
            embedder,
            generator,
            SentenceChunker::default(),
            Retriever::new,
            ContextAssembler::default(),
            StepTimeouts::default(),
        )
    }

    /// Create a service using the chunking, retrieval and timeout sections of `config`.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> RagResult<Self> {
        let chunker = SentenceChunker::new(config.chunking.delimiter.clone())?;
        let top_n = NonZeroUsize::new(config.retrieval.top_n)
            .ok_or_else(|| RagError::Configuration("retrieval.top_n must be at least 1".to_string()))?;

        Ok(Self::build(
            store,
            embedder,
            generator,
            chunker,
            |store| Retriever::new(store).with_default_top_n(top_n),
            ContextAssembler::new(ContextPolicy::from(&config.retrieval)),
            StepTimeouts::from(&config.timeouts),
        ))
    }

    fn build(
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        chunker: SentenceChunker,
        retriever: impl FnOnce(Arc<dyn ChunkStore>) -> Retriever,
        assembler: ContextAssembler,
        timeouts: StepTimeouts,
    ) -> Self {
        let orchestrator = AnswerOrchestrator::new(embedder.clone(), retriever(store.clone()), assembler, generator)
            .with_timeouts(timeouts);

        Self {
            store,
            embedder,
            extractor: Arc::new(PlainTextExtractor::new()),
            chunker,
            orchestrator,
            timeouts,
        }
    }

    /// Replace the document text extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Ingest already-extracted text under a fresh document id.
    pub async fn ingest(&self, raw_text: &str) -> RagResult<IngestReport> {
        self.ingest_text(raw_text, None).await
    }

    /// Extract text from `bytes` and ingest it.
    ///
    /// `document_id` defaults to a new UUID.
    pub async fn ingest_document(&self, bytes: &[u8], document_id: Option<String>) -> RagResult<IngestReport> {
        let text = self.extractor.extract(bytes)?;
        self.ingest_text(&text, document_id).await
    }

    #[instrument(skip_all, fields(document_id))]
    async fn ingest_text(&self, text: &str, document_id: Option<String>) -> RagResult<IngestReport> {
        if text.trim().is_empty() {
            return Err(RagError::Extraction("document contains no readable text".to_string()));
        }

        let document_id = match document_id {
            Some(id) if id.trim().is_empty() => {
                return Err(RagError::InvalidInput("document id cannot be blank".to_string()));
            }
            Some(id) => id.trim().to_string(),
            None => Uuid::new_v4().to_string(),
        };
        tracing::Span::current().record("document_id", document_id.as_str());

        let texts = self.chunker.split(text);
        if texts.is_empty() {
            return Err(RagError::Extraction("document produced no chunks".to_string()));
        }

        let embeddings = with_timeout(
            self.timeouts.embedding,
            self.embedder.embed_batch(&texts),
            embedding_timeout,
        )
        .await?;

        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.name(),
                embeddings.len(),
                texts.len()
            )));
        }

        let chunks: Vec<NewChunk> = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| NewChunk::new(text, embedding).with_document(document_id.clone()))
            .collect();
        let chunk_count = chunks.len();

        let stored = with_timeout(
            self.timeouts.storage,
            async { self.store.insert_batch(chunks).await.map_err(RagError::from) },
            storage_timeout,
        )
        .await
        .inspect_err(|err| warn!(error = %err, chunks = chunk_count, "Ingestion failed"))?;

        info!(chunks = stored.len(), "Ingested document");

        Ok(IngestReport {
            document_id,
            chunks_stored: stored.len(),
        })
    }

    /// Answer a question with the default retrieval depth.
    pub async fn ask(&self, question: &str) -> RagResult<AnswerResponse> {
        self.orchestrator.answer_request(AnswerRequest::new(question)).await
    }

    /// Answer a full request, including a `top_n` override.
    pub async fn ask_request(&self, request: AnswerRequest) -> RagResult<AnswerResponse> {
        self.orchestrator.answer_request(request).await
    }

    /// Retrieve the chunks nearest to `query` without generating an answer.
    pub async fn search(&self, query: &str, n: Option<usize>) -> RagResult<Vec<SimilarityResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::InvalidInput("query cannot be empty".to_string()));
        }

        let embedding = embed_query(self.embedder.as_ref(), query, self.timeouts.embedding).await?;
        let retriever = self.orchestrator.retriever();
        let n = n.unwrap_or_else(|| retriever.default_top_n());

        with_timeout(
            self.timeouts.storage,
            retriever.retrieve(&embedding, n),
            storage_timeout,
        )
        .await
    }

    /// Chunk, document, and dimension counts for the store.
    pub async fn status(&self) -> RagResult<StatusReport> {
        let total_chunks = self.store.count().await?;
        let total_documents = self.store.list_documents().await?.len();
        let dimension = self.store.dimension().await?;

        Ok(StatusReport {
            total_chunks,
            total_documents,
            dimension,
        })
    }

    /// Documents in the store with their chunk counts.
    pub async fn list_documents(&self) -> RagResult<Vec<DocumentSummary>> {
        Ok(self.store.list_documents().await?)
    }
}
