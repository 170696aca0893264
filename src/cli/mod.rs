//! Command-line interface for ragline.

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::errors::RagError;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

pub use context::{load_config, AppContext};

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(about = "ragline - retrieval-augmented question answering over your documents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .ragline/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// ragline subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize ragline configuration and database
    Init(commands::init::InitArgs),
    /// Ingest a plain-text or PDF document
    Ingest(commands::ingest::IngestArgs),
    /// Ask a question answered from ingested documents
    Ask(commands::ask::AskArgs),
    /// Show the chunks nearest to a query without generating an answer
    Search(commands::search::SearchArgs),
    /// Show store status
    Status(commands::status::StatusArgs),
    /// List ingested documents
    Documents(commands::documents::DocumentsArgs),
}

/// Run one parsed invocation to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { command, json, config } = cli;

    if let Commands::Init(args) = command {
        let _logger = LoggerImpl::init(&LogConfig::default())?;
        return commands::init::execute(args, json).await;
    }

    let config = load_config(config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::try_from(&config.logging)?)?;
    let ctx = AppContext::open(config).await?;

    let result = match command {
        Commands::Init(_) => Ok(()),
        Commands::Ingest(args) => commands::ingest::execute(args, &ctx, json).await,
        Commands::Ask(args) => commands::ask::execute(args, &ctx, json).await,
        Commands::Search(args) => commands::search::execute(args, &ctx, json).await,
        Commands::Status(args) => commands::status::execute(args, &ctx, json).await,
        Commands::Documents(args) => commands::documents::execute(args, &ctx, json).await,
    };

    ctx.close().await;
    result
}

/// Print `err` in the selected output mode and exit.
///
/// Caller errors (bad input, unreadable documents) exit with status 2,
/// everything else with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let rag_error = err.downcast_ref::<RagError>();
    let kind = rag_error.map_or("error", RagError::kind);
    let exit_code = if rag_error.is_some_and(RagError::is_caller_error) { 2 } else { 1 };

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": kind,
            "message": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }

    std::process::exit(exit_code)
}
