//! Implementation of the `ragline search` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::SimilarityResult;

/// Arguments for `ragline search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to find similar chunks for
    pub query: String,

    /// Number of results
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,
}

/// Nearest chunks for a query.
#[derive(Debug, serde::Serialize)]
pub struct SearchOutput {
    /// Query as given.
    pub query: String,
    /// Matches ordered by ascending distance.
    pub results: Vec<SimilarityResult>,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.results.is_empty() {
            return "No matching chunks.".to_string();
        }
        let mut lines = vec![format!("Found {} chunk(s):", self.results.len())];
        for result in &self.results {
            lines.push(format!(
                "  [{}] distance {:.4}  {}{}",
                result.chunk_id,
                result.distance,
                truncate(&result.text, 70),
                result
                    .source_document_id
                    .as_deref()
                    .map(|doc| format!("  ({doc})"))
                    .unwrap_or_default()
            ));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Show the chunks nearest to a query.
pub async fn execute(args: SearchArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.rag_service()?;
    let results = service.search(&args.query, args.top_n).await?;

    output(
        &SearchOutput {
            query: args.query,
            results,
        },
        json_mode,
    );
    Ok(())
}
