//! CodeMind Backend - Abstraction layer for code search and indexing
//!
//! This crate provides a unified interface over a single project's memory
//! store, code search service, incremental indexer, and dependency graph:
//! - Memory CRUD (store/retrieve/delete)
//! - Semantic/keyword/hybrid code search
//! - Index management (index/reindex, file/unit listing)
//! - Dependency-graph queries (dependencies, dependents, path, stats)
//!
//! ## Example
//!
//! ```ignore
//! use codemind_backend::{Backend, LocalBackend};
//! use codemind_config::MindConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MindConfig::default();
//!     let backend = LocalBackend::new(&config, "/path/to/workspace").await?;
//!     let status = backend.get_status().await?;
//!     println!("{} units indexed", status.indexed_unit_count);
//!     Ok(())
//! }
//! ```

mod error;
mod local;
mod traits;
mod types;

pub use codemind_search::ProviderStatus;
pub use error::BackendError;
pub use local::LocalBackend;
pub use traits::Backend;
pub use types::*;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
