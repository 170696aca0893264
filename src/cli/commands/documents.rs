//! Implementation of the `ragline documents` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::DocumentSummary;

/// Arguments for `ragline documents`.
#[derive(Args, Debug)]
pub struct DocumentsArgs {}

/// Document listing.
#[derive(Debug, serde::Serialize)]
pub struct DocumentsOutput {
    /// One entry per source document, oldest first.
    pub documents: Vec<DocumentSummary>,
}

impl CommandOutput for DocumentsOutput {
    fn to_human(&self) -> String {
        if self.documents.is_empty() {
            return "No documents ingested.".to_string();
        }
        let mut lines = vec![format!("{:<38} {:>7}  {}", "DOCUMENT", "CHUNKS", "INGESTED")];
        for doc in &self.documents {
            lines.push(format!(
                "{:<38} {:>7}  {}",
                doc.document_id,
                doc.chunk_count,
                doc.created_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// List ingested documents.
pub async fn execute(_args: DocumentsArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.rag_service()?;
    let documents = service.list_documents().await?;

    output(&DocumentsOutput { documents }, json_mode);
    Ok(())
}
