//! Error types for codemind-search

use thiserror::Error;

/// Errors that can occur in codemind-search operations
#[derive(Error, Debug)]
pub enum SearchError {
    /// Qdrant client error
    #[error("Qdrant error: {0}")]
    Qdrant(String),

    /// Collection not found
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Collection already exists
    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(String),

    // =========================================================================
    // Provider errors
    // =========================================================================
    /// Embedding provider unavailable
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Embedding dimension mismatch
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Azure ML authentication failed
    #[error("Azure ML authentication failed: {0}")]
    AzureMLAuth(String),

    /// Azure ML rate limited
    #[error("Azure ML rate limited, retry after {retry_after:?} seconds")]
    AzureMLRateLimit { retry_after: Option<u64> },

    /// Azure ML request timed out
    #[error("Azure ML request timed out")]
    AzureMLTimeout,

    /// OpenAI authentication failed
    #[error("OpenAI authentication failed: {0}")]
    OpenAIAuth(String),

    /// OpenAI rate limited
    #[error("OpenAI rate limited, retry after {retry_after:?} seconds")]
    OpenAIRateLimit { retry_after: Option<u64> },

    /// OpenAI model not found
    #[error("OpenAI model not found: {0}")]
    OpenAIInvalidModel(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Error taxonomy (§7)
    // =========================================================================
    /// Bad argument: unknown search mode, invalid regex, unknown pattern_mode,
    /// empty required snippet, ranking weights out of range, etc.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// A write was attempted while the service is running in read-only mode.
    #[error("read-only mode: {0}")]
    ReadOnlyError(String),

    /// A store operation failed after retries/timeout.
    #[error("storage error: {0}")]
    StorageError(String),

    /// The query pipeline failed or timed out.
    #[error("retrieval error: {0}")]
    RetrievalError(String),

    /// Embedding generation failed (empty input, model error).
    #[error("embedding error: {0}")]
    EmbeddingError(String),

    /// `id` not present for `delete`/`update`/`get_by_id`.
    #[error("memory not found: {0}")]
    MemoryNotFoundError(String),

    /// SQLite error from the keyword store / embedding cache.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl SearchError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::StorageError(_) | SearchError::EmbeddingError(_)
        )
    }
}

impl From<qdrant_client::QdrantError> for SearchError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        SearchError::Qdrant(err.to_string())
    }
}

impl From<candle_core::Error> for SearchError {
    fn from(err: candle_core::Error) -> Self {
        SearchError::Embedding(err.to_string())
    }
}

/// Result type for codemind-search operations
pub type Result<T> = std::result::Result<T, SearchError>;
