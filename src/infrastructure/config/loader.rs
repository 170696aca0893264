//! Figment-based loading and validation of [`Config`].

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding project configuration and the default database.
pub const CONFIG_DIR: &str = ".ragline";

/// Prefix for environment overrides, e.g. `RAGLINE_RETRIEVAL__TOP_N=3`.
pub const ENV_PREFIX: &str = "RAGLINE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown rotation policy.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    /// `database.path` is empty.
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    /// `database.max_connections` is zero.
    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    /// `chunking.delimiter` is empty.
    #[error("Chunk delimiter cannot be empty")]
    EmptyDelimiter,

    /// `retrieval.top_n` is zero.
    #[error("Invalid top_n: {0}. Must be at least 1")]
    InvalidTopN(usize),

    /// `retrieval.max_context_chars` is zero.
    #[error("Invalid max_context_chars: {0}. Must be at least 1")]
    InvalidMaxContextChars(usize),

    /// Unknown embedding provider.
    #[error("Invalid embedding provider: {0}. Must be one of: openai, hash")]
    InvalidEmbeddingProvider(String),

    /// `embedding.dimension` is zero.
    #[error("Invalid embedding dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    /// `embedding.max_batch_size` is zero.
    #[error("Invalid max_batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    /// A step timeout is zero.
    #[error("Invalid timeout for {0}: must be at least 1 second")]
    InvalidTimeout(&'static str),

    /// Any other validation failure.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .ragline/config.yaml (project config, created by init)
    /// 3. .ragline/local.yaml (project local overrides, optional)
    /// 4. Environment variables (RAGLINE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new(CONFIG_DIR))
    }

    /// Same as [`ConfigLoader::load`] with the config directory at `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        if config.chunking.delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }

        if config.retrieval.top_n == 0 {
            return Err(ConfigError::InvalidTopN(config.retrieval.top_n));
        }

        if config.retrieval.max_context_chars == Some(0) {
            return Err(ConfigError::InvalidMaxContextChars(0));
        }

        let valid_providers = ["openai", "hash"];
        if !valid_providers.contains(&config.embedding.provider.as_str()) {
            return Err(ConfigError::InvalidEmbeddingProvider(config.embedding.provider.clone()));
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigError::InvalidDimension(config.embedding.dimension));
        }

        if config.embedding.max_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.embedding.max_batch_size));
        }

        for (name, value) in [
            ("embedding.base_url", &config.embedding.base_url),
            ("embedding.model", &config.embedding.model),
            ("generation.base_url", &config.generation.base_url),
            ("generation.model", &config.generation.model),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!("{name} cannot be empty")));
            }
        }

        for (name, secs) in [
            ("embedding", config.timeouts.embedding_secs),
            ("storage", config.timeouts.storage_secs),
            ("generation", config.timeouts.generation_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout(name));
            }
        }

        Ok(())
    }
}
