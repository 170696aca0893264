//! Test doubles shared by service unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::{GenerationError, RagResult};
use crate::domain::ports::{EmbeddingProvider, GenerationProvider};

/// Generator that records prompts and replies with a fixed answer or error.
pub struct RecordingGenerator {
    reply: Result<String, (u16, String)>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    /// Generator that always returns `answer`.
    pub fn replying(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Generator that always fails with `status`.
    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for RecordingGenerator {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn generate(&self, prompt: &str) -> RagResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(answer) => Ok(answer.clone()),
            Err((status, message)) => Err(GenerationError::Status {
                status: *status,
                message: message.clone(),
            }
            .into()),
        }
    }
}

/// Embedder that never answers.
pub struct StallingEmbedder;

#[async_trait]
impl EmbeddingProvider for StallingEmbedder {
    fn name(&self) -> &'static str {
        "stalling"
    }

    fn dimension(&self) -> usize {
        4
    }

    async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
        std::future::pending().await
    }
}

/// Embedder that returns empty vectors.
pub struct EmptyEmbedder;

#[async_trait]
impl EmbeddingProvider for EmptyEmbedder {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn dimension(&self) -> usize {
        0
    }

    async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
        Ok(Vec::new())
    }
}
