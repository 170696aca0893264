//! Document text extraction port.

use crate::domain::errors::RagResult;

/// Turns raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    /// Short extractor name for logs.
    fn name(&self) -> &'static str;

    /// Extract text from `bytes`.
    ///
    /// Returns `RagError::Extraction` when the document holds no text.
    fn extract(&self, bytes: &[u8]) -> RagResult<String>;
}
