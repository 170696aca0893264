//! Domain errors for the ragline retrieval pipeline.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the embedding store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The vector's length differs from the store's dimension.
    #[error("Embedding dimension mismatch: store holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch {
        /// Dimension the store already holds.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// Zero-length vector.
    #[error("Embedding vector is empty")]
    EmptyEmbedding,

    /// Component at this index is NaN or infinite.
    #[error("Embedding vector contains non-finite component at index {0}")]
    InvalidEmbedding(usize),

    /// Chunk failed validation before insert.
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    /// A stored row could not be decoded.
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),

    /// The store did not answer in time.
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// The pool could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema setup failed.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Underlying sqlx failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors raised while talking to the text-generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Non-success HTTP status from the service.
    #[error("Generation service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text from the response, secrets scrubbed.
        message: String,
    },

    /// The response body had no usable text.
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    /// The request never completed.
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// No response within the step timeout.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// Missing key or bad endpoint.
    #[error("Generation provider misconfigured: {0}")]
    Configuration(String),
}

impl GenerationError {
    /// Upstream HTTP status, when the service answered at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Top-level error for every pipeline operation.
#[derive(Debug, Error)]
pub enum RagError {
    /// Caller-supplied input was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No text could be extracted from a document.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// The embedding provider failed.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The chunk store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The generation service failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RagError {
    /// Short machine-readable category, used in CLI JSON output and logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Extraction(_) => "extraction_error",
            Self::Embedding(_) => "embedding_error",
            Self::Storage(_) => "storage_error",
            Self::Generation(_) => "generation_error",
            Self::Configuration(_) => "configuration_error",
        }
    }

    /// Whether the caller can fix the request and try again.
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Extraction(_))
    }
}

/// Result alias for pipeline operations.
pub type RagResult<T> = Result<T, RagError>;

impl From<sqlx::Error> for RagError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(StorageError::Database(err))
    }
}
