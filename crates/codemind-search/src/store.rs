//! Uniform store interface (C11 Vector Store / C12 Keyword Store).
//!
//! Both backends implement the same trait so the indexer (C14) and search
//! service (C15) are backend-agnostic; [`crate::stores::factory`] (C13)
//! decides which concrete backend to hand back.

use async_trait::async_trait;

use crate::error::Result;
use crate::memory::{Memory, MemoryFilter, MemoryPatch, Page};

/// A retrieved memory paired with its relevance score in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub memory: Memory,
    pub score: f32,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Create the backing collection/table/schema if it does not exist yet.
    async fn initialize(&self) -> Result<()>;

    async fn store(&self, memory: Memory, vector: Option<Vec<f32>>) -> Result<()>;

    async fn batch_store(&self, items: Vec<(Memory, Option<Vec<f32>>)>) -> Result<()>;

    /// Retrieve up to `limit` memories matching `filter`, ranked by
    /// `query_vector` (vector backend, cosine similarity normalized to
    /// `[0, 1]`) or `query_text` (keyword backend, normalized relevance).
    async fn retrieve(
        &self,
        query_vector: Option<Vec<f32>>,
        query_text: Option<&str>,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<ScoredMemory>>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Memory>>;

    async fn count(&self, filter: &MemoryFilter) -> Result<usize>;

    async fn update(&self, id: &str, patch: &MemoryPatch) -> Result<()>;

    async fn scroll(&self, filter: &MemoryFilter, limit: usize, offset: usize) -> Result<Page<Memory>>;

    /// Deletes every code memory (`category="code"`) for a project. Used by
    /// full reindex.
    async fn delete_code_units_by_project(&self, project_name: &str) -> Result<usize>;

    async fn get_indexed_files(&self, project_name: &str, limit: usize, offset: usize) -> Result<Page<String>>;

    async fn list_indexed_units(
        &self,
        project_name: &str,
        file_path: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Memory>>;

    async fn health_check(&self) -> Result<bool>;

    async fn close(&self) -> Result<()>;
}
