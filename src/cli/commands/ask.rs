//! Implementation of the `ragline ask` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{AnswerRequest, AnswerResponse};

/// Arguments for `ragline ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    /// Number of chunks to retrieve as context
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Print the chunks used as context
    #[arg(long)]
    pub show_sources: bool,
}

/// Answer printed by `ragline ask`.
#[derive(Debug, serde::Serialize)]
pub struct AskOutput {
    /// Generated answer and the chunks it was built from.
    #[serde(flatten)]
    pub response: AnswerResponse,
    /// List the source chunks in human output.
    #[serde(skip)]
    pub show_sources: bool,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.response.answer.trim_end().to_string()];
        if self.show_sources && !self.response.sources.is_empty() {
            lines.push("\nSources:".to_string());
            for source in &self.response.sources {
                lines.push(format!(
                    "  [{}] ({:.3}) {}",
                    source.chunk_id,
                    source.similarity(),
                    truncate(&source.text, 80)
                ));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.response).unwrap_or_default()
    }
}

/// Answer one question from the store.
pub async fn execute(args: AskArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.rag_service()?;

    let mut request = AnswerRequest::new(args.question);
    if let Some(top_n) = args.top_n {
        request = request.with_top_n(top_n);
    }
    let response = service.ask_request(request).await?;

    output(
        &AskOutput {
            response,
            show_sources: args.show_sources,
        },
        json_mode,
    );
    Ok(())
}
