//! Vector Store (C11): the `memories` Qdrant collection behind the uniform
//! `MemoryStore` interface.

use async_trait::async_trait;
use qdrant_client::qdrant::{Condition, Filter, Range};

use crate::client::QdrantStore;
use crate::error::{Result, SearchError};
use crate::memory::{Memory, MemoryFilter, MemoryPatch, Page};
use crate::schema::{self, collections, fields};
use crate::store::{MemoryStore, ScoredMemory};

pub struct VectorStore {
    client: QdrantStore,
}

impl VectorStore {
    pub fn new(client: QdrantStore) -> Self {
        Self { client }
    }
}

fn build_filter(filter: &MemoryFilter) -> Option<Filter> {
    let mut must = Vec::new();

    if let Some(scope) = &filter.scope {
        must.push(Condition::matches(fields::SCOPE, scope.clone()));
    }
    if let Some(project) = &filter.project_name {
        must.push(Condition::matches(fields::PROJECT_NAME, project.clone()));
    }
    if let Some(category) = &filter.category {
        must.push(Condition::matches(fields::CATEGORY, category.clone()));
    }
    if let Some(level) = filter.context_level {
        must.push(Condition::matches(fields::CONTEXT_LEVEL, schema::context_level_str(level).to_string()));
    }
    for tag in &filter.tags {
        must.push(Condition::matches(fields::TAGS, tag.clone()));
    }
    if let Some(min) = filter.min_importance {
        must.push(Condition::range(
            fields::IMPORTANCE,
            Range {
                gte: Some(min as f64),
                ..Default::default()
            },
        ));
    }

    if must.is_empty() {
        None
    } else {
        Some(Filter::must(must))
    }
}

fn project_filter(project_name: &str, extra: impl IntoIterator<Item = Condition>) -> Filter {
    let mut must = vec![Condition::matches(fields::PROJECT_NAME, project_name.to_string())];
    must.extend(extra);
    Filter::must(must)
}

#[async_trait]
impl MemoryStore for VectorStore {
    async fn initialize(&self) -> Result<()> {
        self.client.ensure_collection().await
    }

    async fn store(&self, memory: Memory, vector: Option<Vec<f32>>) -> Result<()> {
        let vector = vector.ok_or_else(|| SearchError::StorageError("vector store requires an embedding".into()))?;
        let payload = schema::memory_to_payload(&memory);
        self.client.upsert(collections::MEMORIES, &memory.id, vector, payload).await
    }

    async fn batch_store(&self, items: Vec<(Memory, Option<Vec<f32>>)>) -> Result<()> {
        let mut batch = Vec::with_capacity(items.len());
        for (memory, vector) in items {
            let vector = vector.ok_or_else(|| SearchError::StorageError("vector store requires an embedding".into()))?;
            let payload = schema::memory_to_payload(&memory);
            batch.push((memory.id, vector, payload));
        }
        self.client.upsert_batch(collections::MEMORIES, batch).await
    }

    async fn retrieve(
        &self,
        query_vector: Option<Vec<f32>>,
        _query_text: Option<&str>,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<ScoredMemory>> {
        let qfilter = build_filter(filter);
        let Some(query_vector) = query_vector else {
            let hits = self.client.scroll(collections::MEMORIES, qfilter, limit as u32).await?;
            return Ok(hits
                .into_iter()
                .map(|payload| ScoredMemory {
                    memory: schema::payload_to_memory(&payload),
                    score: 1.0,
                })
                .collect());
        };

        let hits = self
            .client
            .search(collections::MEMORIES, query_vector, limit as u64, qfilter)
            .await?;
        Ok(hits
            .into_iter()
            .map(|(payload, score)| ScoredMemory {
                memory: schema::payload_to_memory(&payload),
                score,
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_by_id(collections::MEMORIES, id).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Memory>> {
        let hit = self.client.get_by_id(collections::MEMORIES, id).await?;
        Ok(hit.map(|payload| schema::payload_to_memory(&payload)))
    }

    async fn count(&self, filter: &MemoryFilter) -> Result<usize> {
        self.client.count(collections::MEMORIES, build_filter(filter)).await
    }

    async fn update(&self, id: &str, patch: &MemoryPatch) -> Result<()> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| SearchError::MemoryNotFoundError(id.to_string()))?;

        let mut memory = existing;
        patch.apply(&mut memory);

        let payload = schema::memory_to_payload(&memory);
        self.client.set_payload(collections::MEMORIES, id, payload).await
    }

    async fn scroll(&self, filter: &MemoryFilter, limit: usize, offset: usize) -> Result<Page<Memory>> {
        let qfilter = build_filter(filter);
        let total = self.client.count(collections::MEMORIES, qfilter.clone()).await?;
        let hits = self
            .client
            .scroll(collections::MEMORIES, qfilter, (limit + offset) as u32)
            .await?;
        let items: Vec<Memory> = hits
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|payload| schema::payload_to_memory(&payload))
            .collect();
        Ok(Page::new(items, total, limit, offset))
    }

    async fn delete_code_units_by_project(&self, project_name: &str) -> Result<usize> {
        let filter = project_filter(project_name, [Condition::matches(fields::CATEGORY, crate::memory::CATEGORY_CODE.to_string())]);
        let count = self.client.count(collections::MEMORIES, Some(filter.clone())).await?;
        self.client.delete_by_filter(collections::MEMORIES, filter).await?;
        Ok(count)
    }

    async fn get_indexed_files(&self, project_name: &str, limit: usize, offset: usize) -> Result<Page<String>> {
        let filter = project_filter(project_name, [Condition::matches(fields::CATEGORY, crate::memory::CATEGORY_CODE.to_string())]);
        let hits = self.client.scroll(collections::MEMORIES, Some(filter), 10_000).await?;

        let mut files: Vec<String> = hits
            .into_iter()
            .filter_map(|payload| payload.get(fields::FILE_PATH).and_then(|v| v.as_str()).map(String::from))
            .collect();
        files.sort();
        files.dedup();

        let total = files.len();
        let items: Vec<String> = files.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, total, limit, offset))
    }

    async fn list_indexed_units(
        &self,
        project_name: &str,
        file_path: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Memory>> {
        let mut filter = MemoryFilter {
            project_name: Some(project_name.to_string()),
            category: Some(crate::memory::CATEGORY_CODE.to_string()),
            ..Default::default()
        };
        if let Some(path) = file_path {
            // file_path is carried in metadata, not a first-class MemoryFilter
            // field; post-filter client-side below.
            filter.tags.clear();
            let page = self.scroll(&filter, 10_000, 0).await?;
            let mut items: Vec<Memory> = page
                .items
                .into_iter()
                .filter(|m| m.metadata_str(fields::FILE_PATH) == Some(path))
                .collect();
            let total = items.len();
            items = items.into_iter().skip(offset).take(limit).collect();
            return Ok(Page::new(items, total, limit, offset));
        }
        self.scroll(&filter, limit, offset).await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.client.collection_exists(collections::MEMORIES).await.unwrap_or(false))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
