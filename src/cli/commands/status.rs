//! Implementation of the `ragline status` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::StatusReport;

/// Arguments for `ragline status`.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Store status.
#[derive(Debug, serde::Serialize)]
pub struct StatusOutput {
    /// Chunk and document counts.
    #[serde(flatten)]
    pub report: StatusReport,
    /// Database file in use.
    pub database: String,
    /// Configured embedding provider.
    pub embedding_provider: String,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let dimension = self
            .report
            .dimension
            .map_or_else(|| "not established".to_string(), |d| d.to_string());
        [
            format!("Database:           {}", self.database),
            format!("Embedding provider: {}", self.embedding_provider),
            format!("Total entries:      {}", self.report.total_chunks),
            format!("Documents:          {}", self.report.total_documents),
            format!("Dimension:          {dimension}"),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Report store status.
pub async fn execute(_args: StatusArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.rag_service()?;
    let report = service.status().await?;

    output(
        &StatusOutput {
            report,
            database: ctx.config.database.path.clone(),
            embedding_provider: ctx.config.embedding.provider.clone(),
        },
        json_mode,
    );
    Ok(())
}
