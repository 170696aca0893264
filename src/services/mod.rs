//! Application services: the retrieval pipeline and its boundary.

pub mod answer_orchestrator;
pub mod chunker;
pub mod context_assembler;
pub mod rag_service;
pub mod retriever;

#[cfg(test)]
pub(crate) mod test_support;

pub use answer_orchestrator::{build_prompt, AnswerOrchestrator, StepTimeouts};
pub use chunker::SentenceChunker;
pub use context_assembler::{ContextAssembler, ContextPolicy, NO_CONTEXT_SENTINEL};
pub use rag_service::RagService;
pub use retriever::Retriever;
