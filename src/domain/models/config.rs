//! Configuration model, deserialized from YAML and environment overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for ragline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Chunking policy
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval and context assembly policy
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Embedding service
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Text generation service
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per-step timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_database_path() -> String {
    ".ragline/ragline.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_acquire_timeout_secs() -> u64 {
    10
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation policy for file logs: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Chunking policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    /// Delimiter marking the end of a sentence
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ". ".to_string()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

/// Retrieval and context assembly policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Upper bound on assembled context, in characters (`None` = unbounded)
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: Option<usize>,

    /// Drop repeated chunk texts from the assembled context
    #[serde(default)]
    pub deduplicate: bool,
}

const fn default_top_n() -> usize {
    5
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_context_chars() -> Option<usize> {
    Some(8_000)
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_context_chars: default_max_context_chars(),
            deduplicate: false,
        }
    }
}

/// Embedding service configuration (OpenAI-compatible `/embeddings` API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Provider: openai or hash (local, offline)
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API base URL
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected output dimensionality
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Maximum texts per request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_embedding_dimension() -> usize {
    1536
}

const fn default_max_batch_size() -> usize {
    256
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            api_key: None,
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Text generation service configuration (Gemini `generateContent` API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// API base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// API key; falls back to `GEMINI_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generation_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key: None,
        }
    }
}

/// Timeouts for the latency-bearing pipeline steps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Embedding request timeout in seconds.
    #[serde(default = "default_embedding_secs")]
    pub embedding_secs: u64,

    /// Store query timeout in seconds.
    #[serde(default = "default_storage_secs")]
    pub storage_secs: u64,

    /// Generation request timeout in seconds.
    #[serde(default = "default_generation_secs")]
    pub generation_secs: u64,
}

const fn default_embedding_secs() -> u64 {
    30
}

const fn default_storage_secs() -> u64 {
    10
}

const fn default_generation_secs() -> u64 {
    60
}

impl TimeoutConfig {
    /// Embedding timeout.
    pub const fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_secs)
    }

    /// Store timeout.
    pub const fn storage(&self) -> Duration {
        Duration::from_secs(self.storage_secs)
    }

    /// Generation timeout.
    pub const fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            embedding_secs: default_embedding_secs(),
            storage_secs: default_storage_secs(),
            generation_secs: default_generation_secs(),
        }
    }
}
