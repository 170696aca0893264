//! PDF text extraction via lopdf.

use lopdf::Document;
use tracing::{debug, warn};

use crate::domain::errors::{RagError, RagResult};
use crate::domain::ports::TextExtractor;

/// Leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Extractor for PDF documents; page texts are joined with newlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a PDF extractor.
    pub const fn new() -> Self {
        Self
    }

    /// True when `bytes` start with the PDF signature.
    pub fn is_pdf(bytes: &[u8]) -> bool {
        bytes.starts_with(PDF_SIGNATURE)
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, bytes: &[u8]) -> RagResult<String> {
        if !Self::is_pdf(bytes) {
            return Err(RagError::InvalidInput("Document is not a PDF".to_string()));
        }

        let document = Document::load_mem(bytes)
            .map_err(|e| RagError::Extraction(format!("Could not read PDF document: {e}")))?;

        let pages = document.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text.trim().to_string()),
                // Unreadable pages are skipped; blank output is rejected below.
                Err(e) => warn!(page = page_number, error = %e, "Skipping unreadable PDF page"),
            }
        }

        let text = texts.join("\n");
        if text.trim().is_empty() {
            return Err(RagError::Extraction("Could not extract text from the document".to_string()));
        }

        debug!(pages = pages.len(), chars = text.len(), "Extracted PDF text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build an in-memory PDF with one Courier text line per page.
    fn fixture_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in pages {
            let operations = if line.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_extracts_every_page_in_order() {
        let bytes = fixture_pdf(&["Paris is the capital of France.", "Berlin is the capital of Germany."]);
        assert!(PdfExtractor::is_pdf(&bytes));

        let text = PdfExtractor.extract(&bytes).unwrap();

        let paris = text.find("Paris").unwrap();
        let berlin = text.find("Berlin").unwrap();
        assert!(paris < berlin);
        assert!(text[paris..berlin].contains('\n'));
    }

    #[test]
    fn test_pdf_without_text_is_extraction_error() {
        let bytes = fixture_pdf(&[""]);
        let err = PdfExtractor.extract(&bytes).unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));
    }

    #[test]
    fn test_truncated_pdf_is_extraction_error() {
        let err = PdfExtractor.extract(b"%PDF-1.7\nnot really a pdf").unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));
    }

    #[test]
    fn test_non_pdf_rejected() {
        let err = PdfExtractor.extract(b"plain words").unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
        assert!(!PdfExtractor::is_pdf(b"plain words"));
    }
}
