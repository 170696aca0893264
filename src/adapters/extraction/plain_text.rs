//! UTF-8 plain-text extraction.

use super::pdf::PDF_SIGNATURE;
use crate::domain::errors::{RagError, RagResult};
use crate::domain::ports::TextExtractor;

const UTF8_BOM: char = '\u{feff}';

/// Extractor for UTF-8 text documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Create a plain-text extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    fn extract(&self, bytes: &[u8]) -> RagResult<String> {
        if bytes.starts_with(PDF_SIGNATURE) {
            return Err(RagError::InvalidInput(
                "PDF documents need the PDF extractor".to_string(),
            ));
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|e| RagError::InvalidInput(format!("Document is not valid UTF-8: {e}")))?;
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        if text.trim().is_empty() {
            return Err(RagError::Extraction("Could not extract text from the document".to_string()));
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_utf8() {
        let text = PlainTextExtractor.extract("Paris is the capital of France.".as_bytes()).unwrap();
        assert_eq!(text, "Paris is the capital of France.");
    }

    #[test]
    fn test_strips_bom() {
        let text = PlainTextExtractor.extract(b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_blank_document() {
        let err = PlainTextExtractor.extract(b"  \n\t ").unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));

        let err = PlainTextExtractor.extract(b"").unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
    }

    #[test]
    fn test_pdf_rejected() {
        let err = PlainTextExtractor.extract(b"%PDF-1.7\n...").unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
    }
}
