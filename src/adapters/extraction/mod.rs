//! Document text extraction adapters.

pub mod pdf;
pub mod plain_text;

pub use pdf::PdfExtractor;
pub use plain_text::PlainTextExtractor;
