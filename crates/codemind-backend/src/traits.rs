//! Backend trait definition.
//!
//! Defines the async interface implementing the RPC surface (§6): storage,
//! search, indexing, and dependency-graph queries over a single project.

use std::path::Path;

use async_trait::async_trait;
use codemind_search::{IndexStats, Memory, MemoryFilter, Page, ProviderStatus, SearchQuery, SearchResponse};

use crate::error::BackendError;
use crate::types::{ActivityEntry, BackendStatus, DashboardStats};

/// Backend for memory storage, code search, indexing, and dependency
/// queries. All operations are async; write operations reject with
/// `BackendError::ReadOnly` when the backend is configured read-only.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Store a free-form or code memory, returning its id.
    async fn store_memory(&self, memory: Memory) -> Result<String, BackendError>;

    /// Retrieve memories matching `filter`.
    async fn retrieve_memories(&self, filter: MemoryFilter, limit: usize, offset: usize) -> Result<Page<Memory>, BackendError>;

    /// Delete a memory by id.
    async fn delete_memory(&self, id: &str) -> Result<(), BackendError>;

    /// Snapshot of backend health, storage backend in use, and index size.
    async fn get_status(&self) -> Result<BackendStatus, BackendError>;

    /// Run a code search query (§4.14).
    async fn search_code(&self, query: &str, params: SearchQuery) -> Result<SearchResponse, BackendError>;

    /// Find code similar to an already-indexed unit.
    async fn find_similar_code(&self, unit_id: &str, limit: usize) -> Result<SearchResponse, BackendError>;

    /// Index a directory tree for a project from scratch or incrementally.
    async fn index_codebase(&self, root: &Path, project: &str) -> Result<IndexStats, BackendError>;

    /// Delete a project's indexed units and re-index its root from scratch.
    async fn reindex_project(&self, root: &Path, project: &str) -> Result<IndexStats, BackendError>;

    /// List the distinct files indexed for a project.
    async fn get_indexed_files(&self, project: &str, limit: usize, offset: usize) -> Result<Page<String>, BackendError>;

    /// List indexed units for a project, optionally scoped to one file.
    async fn list_indexed_units(
        &self,
        project: &str,
        file_path: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Memory>, BackendError>;

    /// Files a file depends on (resolved import targets within the project).
    async fn get_file_dependencies(&self, project: &str, file_path: &str) -> Result<Vec<String>, BackendError>;

    /// Files that depend on a file.
    async fn get_file_dependents(&self, project: &str, file_path: &str) -> Result<Vec<String>, BackendError>;

    /// Shortest import-edge path between two files, if any.
    async fn find_dependency_path(&self, project: &str, from: &str, to: &str) -> Result<Vec<String>, BackendError>;

    /// Dependency-graph shape statistics for a project.
    async fn get_dependency_stats(&self, project: &str) -> Result<codemind_core::DependencyStats, BackendError>;

    /// Combined index-size and dependency-graph dashboard snapshot.
    async fn get_dashboard_stats(&self, project: &str) -> Result<DashboardStats, BackendError>;

    /// Most recently indexed units for a project.
    async fn get_recent_activity(&self, project: &str, limit: usize) -> Result<Vec<ActivityEntry>, BackendError>;

    /// The repository identifier this backend is scoped to.
    fn repo_id(&self) -> &str;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> Result<bool, BackendError>;

    /// Check embedding provider status.
    async fn check_provider(&self) -> Result<ProviderStatus, BackendError>;
}
