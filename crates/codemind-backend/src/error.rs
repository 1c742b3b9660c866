//! Backend error types.

use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Search/index/store operation failed.
    #[error("search failed: {0}")]
    Search(#[from] codemind_search::SearchError),

    /// Dependency-graph traversal failed (unknown file).
    #[error("dependency graph error: {0}")]
    DependencyGraph(#[from] codemind_core::deps::DependencyGraphError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] codemind_config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write attempted while the backend is in read-only mode.
    #[error("backend is read-only: {operation}")]
    ReadOnly { operation: String },

    /// Bad argument (unknown search mode, invalid regex, unknown preset, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested memory/unit id does not exist.
    #[error("memory not found: {id}")]
    MemoryNotFound { id: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl BackendError {
    pub fn read_only(operation: impl Into<String>) -> Self {
        Self::ReadOnly {
            operation: operation.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn memory_not_found(id: impl Into<String>) -> Self {
        Self::MemoryNotFound { id: id.into() }
    }

    pub fn with_context(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_error_names_the_operation() {
        let err = BackendError::read_only("delete_memory");
        assert!(err.to_string().contains("delete_memory"));
    }

    #[test]
    fn memory_not_found_carries_the_id() {
        let err = BackendError::memory_not_found("abc123");
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn with_context_combines_both_parts() {
        let err = BackendError::with_context("loading index", "file corrupted");
        assert!(err.to_string().contains("loading index"));
        assert!(err.to_string().contains("file corrupted"));
    }
}
