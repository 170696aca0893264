//! Implementation of the `ragline ingest` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::extraction::{PdfExtractor, PlainTextExtractor};
use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::IngestReport;
use crate::domain::ports::TextExtractor;

/// Arguments for `ragline ingest`.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Plain-text or PDF document to ingest
    pub file: PathBuf,

    /// Document id recorded as chunk provenance (generated when omitted)
    #[arg(long)]
    pub document_id: Option<String>,
}

/// Result of one ingest run.
#[derive(Debug, serde::Serialize)]
pub struct IngestOutput {
    /// Always true; failures go through the error path.
    pub success: bool,
    /// File that was ingested.
    pub file: PathBuf,
    /// Document id and stored chunk count.
    #[serde(flatten)]
    pub report: IngestReport,
}

impl CommandOutput for IngestOutput {
    fn to_human(&self) -> String {
        format!(
            "Ingested {} as document {} ({} chunk{})",
            self.file.display(),
            self.report.document_id,
            self.report.chunks_stored,
            if self.report.chunks_stored == 1 { "" } else { "s" }
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Pick the extractor for `path`: PDF by signature or `.pdf` extension, plain text otherwise.
pub fn extractor_for(path: &Path, bytes: &[u8]) -> Arc<dyn TextExtractor> {
    let pdf_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if PdfExtractor::is_pdf(bytes) || pdf_extension {
        Arc::new(PdfExtractor::new())
    } else {
        Arc::new(PlainTextExtractor::new())
    }
}

/// Read, extract, and ingest one document.
pub async fn execute(args: IngestArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let extractor = extractor_for(&args.file, &bytes);
    tracing::debug!(file = %args.file.display(), extractor = extractor.name(), "Selected extractor");
    let service = ctx.rag_service()?.with_extractor(extractor);
    let report = service.ingest_document(&bytes, args.document_id).await?;

    let out = IngestOutput {
        success: true,
        file: args.file,
        report,
    };
    output(&out, json_mode);
    Ok(())
}
