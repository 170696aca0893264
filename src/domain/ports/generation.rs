//! Text generation port.

use async_trait::async_trait;

use crate::domain::errors::RagResult;

/// A language model that turns a prompt into free text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn name(&self) -> &'static str;

    /// Generate a completion for `prompt`.
    ///
    /// Failures surface as `RagError::Generation` carrying the upstream
    /// status when the service answered.
    async fn generate(&self, prompt: &str) -> RagResult<String>;
}
