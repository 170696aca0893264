//! Implementation of the `ragline init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, verify_connection, PoolConfig};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

/// Arguments for `ragline init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Result of `ragline init`.
#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    /// False when the project was already initialized.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Directory that holds `.ragline/`.
    pub initialized_path: PathBuf,
    /// Whether `config.yaml` was written.
    pub config_written: bool,
    /// Whether the database was created and migrated.
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("\nDefault configuration written to .ragline/config.yaml".to_string());
        }
        if self.database_initialized {
            lines.push("Database initialized at .ragline/ragline.db".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Create `.ragline/` with a default config and a migrated database.
pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };

    let ragline_dir = target_path.join(".ragline");

    if ragline_dir.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            config_written: false,
            database_initialized: false,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    if args.force && ragline_dir.exists() {
        fs::remove_dir_all(&ragline_dir).await.context("Failed to remove existing .ragline directory")?;
    }

    fs::create_dir_all(&ragline_dir)
        .await
        .with_context(|| format!("Failed to create {}", ragline_dir.display()))?;

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize default configuration")?;
    fs::write(ragline_dir.join("config.yaml"), yaml)
        .await
        .context("Failed to write .ragline/config.yaml")?;

    let db_url = format!("sqlite:{}", ragline_dir.join("ragline.db").display());
    let pool = initialize_database(&db_url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database")?;
    verify_connection(&pool).await.context("Database not reachable after initialization")?;
    pool.close().await;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        config_written: true,
        database_initialized: true,
    };
    output(&output_data, json_mode);
    Ok(())
}
