//! Sentence chunker.
//!
//! Splits extracted document text into retrievable units on a sentence
//! delimiter. Pieces are trimmed and empty pieces dropped; order is
//! preserved and nothing is deduplicated.

use crate::domain::errors::{RagError, RagResult};

/// Default sentence delimiter.
pub const DEFAULT_DELIMITER: &str = ". ";

/// Splits text on a literal delimiter into trimmed, non-empty chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceChunker {
    delimiter: String,
}

impl SentenceChunker {
    /// Create a chunker splitting on `delimiter`, which must be non-empty.
    pub fn new(delimiter: impl Into<String>) -> RagResult<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(RagError::Configuration("chunk delimiter cannot be empty".to_string()));
        }
        Ok(Self { delimiter })
    }

    /// Delimiter the chunker splits on.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Split `text` into trimmed, non-empty chunks in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        text.split(self.delimiter.as_str())
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}
