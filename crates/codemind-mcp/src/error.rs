//! Error types for the MCP server

use thiserror::Error;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur in the MCP server
#[derive(Error, Debug)]
pub enum McpError {
    /// Backend operation failed (search/store/index/dependency-graph).
    #[error("backend error: {0}")]
    Backend(#[from] codemind_backend::BackendError),

    /// Requested memory/unit id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid parameters provided
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
