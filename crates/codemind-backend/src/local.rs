//! Local backend implementation.
//!
//! Provides direct access to a single project's memory store, code search
//! service, incremental indexer, and an on-demand dependency graph, all
//! scoped to one workspace root.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use codemind_config::MindConfig;
use codemind_core::DependencyGraph;
use codemind_search::{
    embeddings::create_provider, stores::create_memory_store, CodeSearchService,
    DegradationTracker, EmbeddingConfig, EmbeddingGenerator, IncrementalIndexer, Memory,
    MemoryFilter, MemoryStore as SearchMemoryStore, Page, ProviderStatus, QdrantConfig,
    SearchQuery, SearchResponse, StoreConfig,
};

use crate::error::BackendError;
use crate::traits::Backend;
use crate::types::{ActivityEntry, BackendStatus, DashboardStats};

const IMPORTS_METADATA_KEY: &str = "imports";
const FILE_PATH_METADATA_KEY: &str = "file_path";
const UNIT_NAME_METADATA_KEY: &str = "unit_name";

/// Local backend backed by a single `MemoryStore` plus an embedding generator.
pub struct LocalBackend {
    repo_id: String,
    workspace_root: PathBuf,
    config: MindConfig,
    store: Arc<dyn SearchMemoryStore>,
    embeddings: Arc<EmbeddingGenerator>,
    search_service: CodeSearchService,
    tracker: Arc<DegradationTracker>,
    read_only: bool,
}

impl LocalBackend {
    /// Connect a local backend for `workspace_root`, deriving `repo_id` from
    /// the directory name.
    pub async fn new(config: &MindConfig, workspace_root: impl AsRef<Path>) -> Result<Self, BackendError> {
        let workspace_root = workspace_root.as_ref().to_path_buf();
        let repo_id = workspace_root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self::with_repo_id(config, workspace_root, repo_id).await
    }

    /// Connect a local backend for `workspace_root` under an explicit `repo_id`.
    pub async fn with_repo_id(
        config: &MindConfig,
        workspace_root: impl AsRef<Path>,
        repo_id: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let workspace_root = workspace_root.as_ref().to_path_buf();
        let repo_id = repo_id.into();

        let store_config = StoreConfig {
            qdrant: QdrantConfig {
                url: config.backend.qdrant.url.clone(),
                api_key: config.backend.qdrant.api_key.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let tracker = Arc::new(DegradationTracker::new());
        let store = create_memory_store(&store_config, true, &tracker)
            .await
            .map_err(BackendError::Search)?;

        let embeddings = Self::make_embeddings(config)?;
        let search_service = CodeSearchService::new(store.clone(), embeddings.clone());

        Ok(Self {
            repo_id,
            workspace_root,
            config: config.clone(),
            store,
            embeddings,
            search_service,
            tracker,
            read_only: false,
        })
    }

    /// Open the backend in read-only mode: write RPCs reject immediately.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn require_writable(&self, operation: &str) -> Result<(), BackendError> {
        if self.read_only {
            return Err(BackendError::read_only(operation));
        }
        Ok(())
    }

    fn make_embeddings(config: &MindConfig) -> Result<Arc<EmbeddingGenerator>, BackendError> {
        let embedding_config = Self::to_embedding_config(config);
        let provider = create_provider(&embedding_config).map_err(BackendError::Search)?;
        let model_name = config.embedding.provider.to_string();
        Ok(Arc::new(EmbeddingGenerator::new(provider, model_name)))
    }

    /// Convert config's embedding settings to the search crate's provider config.
    fn to_embedding_config(config: &MindConfig) -> EmbeddingConfig {
        use codemind_config::EmbeddingProviderType;
        use codemind_search::{AzureMLAuth, AzureMLConfig, OpenAIConfig};

        match config.embedding.provider {
            EmbeddingProviderType::Local => EmbeddingConfig::local(),
            EmbeddingProviderType::AzureMl => {
                if let Some(ref azure) = config.embedding.azure_ml {
                    let semantic_auth = if let Some(ref env_var) = azure.semantic_auth_key_env {
                        AzureMLAuth::ApiKeyEnv(env_var.clone())
                    } else if let Some(ref env_var) = azure.auth_key_env {
                        AzureMLAuth::ApiKeyEnv(env_var.clone())
                    } else {
                        AzureMLAuth::ApiKeyEnv("CODEMIND_AZURE_ML_SEMANTIC_API_KEY".to_string())
                    };

                    let code_auth = azure
                        .code_auth_key_env
                        .as_ref()
                        .map(|env_var| AzureMLAuth::ApiKeyEnv(env_var.clone()));

                    let azure_config = AzureMLConfig {
                        semantic_endpoint: azure.semantic_endpoint.clone(),
                        code_endpoint: azure.code_endpoint.clone(),
                        semantic_auth,
                        code_auth,
                        timeout_secs: azure.timeout_secs,
                        max_retries: azure.max_retries,
                    };
                    EmbeddingConfig::azure_ml_with_config(azure_config)
                } else {
                    EmbeddingConfig::azure_ml()
                }
            }
            EmbeddingProviderType::Openai => {
                if let Some(ref openai) = config.embedding.openai {
                    let api_key = openai
                        .api_key_env
                        .as_ref()
                        .and_then(|env_var| std::env::var(env_var).ok());

                    let openai_config = OpenAIConfig {
                        base_url: openai.url.clone(),
                        api_key,
                        semantic_model: openai.semantic_model.clone(),
                        code_model: openai.code_model.clone(),
                        timeout_secs: openai.timeout_secs,
                        max_retries: openai.max_retries,
                        azure_mode: openai.azure_mode,
                    };
                    EmbeddingConfig::openai_with_config(openai_config)
                } else {
                    EmbeddingConfig::openai()
                }
            }
        }
    }

    fn indexer(&self, project: &str) -> IncrementalIndexer {
        IncrementalIndexer::new(self.store.clone(), self.embeddings.clone(), project.to_string())
    }

    /// Build a dependency graph for `project` by scrolling every indexed code
    /// unit and replaying its recorded imports. Rebuilt fresh on every call;
    /// there is no persisted dependency-graph store.
    async fn load_dependency_graph(&self, project: &str) -> Result<DependencyGraph, BackendError> {
        let mut graph = DependencyGraph::new();
        let filter = MemoryFilter {
            project_name: Some(project.to_string()),
            category: Some("code".to_string()),
            ..Default::default()
        };

        let mut offset = 0;
        const PAGE_SIZE: usize = 500;
        loop {
            let page = self
                .store
                .scroll(&filter, PAGE_SIZE, offset)
                .await
                .map_err(BackendError::Search)?;

            for unit in &page.items {
                let Some(file_path) = unit.metadata_str(FILE_PATH_METADATA_KEY) else {
                    continue;
                };
                graph.add_file(file_path);
                if let Some(imports) = unit.metadata.get(IMPORTS_METADATA_KEY).and_then(|v| v.as_array()) {
                    for import in imports {
                        if let Some(module) = import.as_str() {
                            graph.add_import(file_path, module);
                        }
                    }
                }
            }

            if !page.has_more {
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(graph)
    }

    async fn recent_code_units(&self, project: &str, limit: usize) -> Result<Vec<Memory>, BackendError> {
        let filter = MemoryFilter {
            project_name: Some(project.to_string()),
            category: Some("code".to_string()),
            ..Default::default()
        };
        let page = self
            .store
            .scroll(&filter, limit.max(1), 0)
            .await
            .map_err(BackendError::Search)?;
        let mut units = page.items;
        units.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        units.truncate(limit);
        Ok(units)
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn store_memory(&self, mut memory: Memory) -> Result<String, BackendError> {
        self.require_writable("store_memory")?;
        let vector = self.embeddings.generate(&memory.content).await.map_err(BackendError::Search)?;
        memory.embedding_model = self.embeddings.model_name().to_string();
        let id = memory.id.clone();
        self.store.store(memory, Some(vector)).await.map_err(BackendError::Search)?;
        Ok(id)
    }

    async fn retrieve_memories(&self, filter: MemoryFilter, limit: usize, offset: usize) -> Result<Page<Memory>, BackendError> {
        self.store.scroll(&filter, limit, offset).await.map_err(BackendError::Search)
    }

    async fn delete_memory(&self, id: &str) -> Result<(), BackendError> {
        self.require_writable("delete_memory")?;
        let exists = self.store.get_by_id(id).await.map_err(BackendError::Search)?;
        if exists.is_none() {
            return Err(BackendError::memory_not_found(id));
        }
        self.store.delete(id).await.map_err(BackendError::Search)
    }

    async fn get_status(&self) -> Result<BackendStatus, BackendError> {
        let all = MemoryFilter::default();
        let indexed_unit_count = self.store.count(&all).await.map_err(BackendError::Search)?;
        let files = self.store.get_indexed_files(&self.repo_id, 1, 0).await.map_err(BackendError::Search)?;

        Ok(BackendStatus {
            repo_id: self.repo_id.clone(),
            storage_backend: if self.tracker.has_degradations() { "keyword (degraded)" } else { "vector" }.to_string(),
            degraded: self.tracker.has_degradations(),
            degradation_summary: self
                .tracker
                .get_summary()
                .into_iter()
                .map(|record| format!("{}: {}", record.component, record.message))
                .collect(),
            indexed_file_count: files.total,
            indexed_unit_count,
        })
    }

    async fn search_code(&self, query: &str, params: SearchQuery) -> Result<SearchResponse, BackendError> {
        self.search_service.search_code(query, params).await.map_err(BackendError::Search)
    }

    async fn find_similar_code(&self, unit_id: &str, limit: usize) -> Result<SearchResponse, BackendError> {
        let unit = self
            .store
            .get_by_id(unit_id)
            .await
            .map_err(BackendError::Search)?
            .ok_or_else(|| BackendError::memory_not_found(unit_id))?;

        let params = SearchQuery {
            limit,
            project_name: unit.project_name.clone(),
            ..SearchQuery::new()
        };
        self.search_service
            .find_similar_code(&unit.content, params)
            .await
            .map_err(BackendError::Search)
    }

    async fn index_codebase(&self, root: &Path, project: &str) -> Result<codemind_search::IndexStats, BackendError> {
        self.require_writable("index_codebase")?;
        self.indexer(project)
            .index_directory(root, true, None, None)
            .await
            .map_err(BackendError::Search)
    }

    async fn reindex_project(&self, root: &Path, project: &str) -> Result<codemind_search::IndexStats, BackendError> {
        self.require_writable("reindex_project")?;
        self.store.delete_code_units_by_project(project).await.map_err(BackendError::Search)?;
        self.indexer(project)
            .index_directory(root, true, None, None)
            .await
            .map_err(BackendError::Search)
    }

    async fn get_indexed_files(&self, project: &str, limit: usize, offset: usize) -> Result<Page<String>, BackendError> {
        self.store.get_indexed_files(project, limit, offset).await.map_err(BackendError::Search)
    }

    async fn list_indexed_units(
        &self,
        project: &str,
        file_path: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Memory>, BackendError> {
        self.store
            .list_indexed_units(project, file_path, limit, offset)
            .await
            .map_err(BackendError::Search)
    }

    async fn get_file_dependencies(&self, project: &str, file_path: &str) -> Result<Vec<String>, BackendError> {
        let graph = self.load_dependency_graph(project).await?;
        Ok(graph.dependencies_of(file_path))
    }

    async fn get_file_dependents(&self, project: &str, file_path: &str) -> Result<Vec<String>, BackendError> {
        let graph = self.load_dependency_graph(project).await?;
        Ok(graph.dependents_of(file_path))
    }

    async fn find_dependency_path(&self, project: &str, from: &str, to: &str) -> Result<Vec<String>, BackendError> {
        let graph = self.load_dependency_graph(project).await?;
        graph.find_path(from, to).map_err(BackendError::DependencyGraph)
    }

    async fn get_dependency_stats(&self, project: &str) -> Result<codemind_core::DependencyStats, BackendError> {
        let graph = self.load_dependency_graph(project).await?;
        Ok(graph.stats())
    }

    async fn get_dashboard_stats(&self, project: &str) -> Result<DashboardStats, BackendError> {
        let filter = MemoryFilter {
            project_name: Some(project.to_string()),
            category: Some("code".to_string()),
            ..Default::default()
        };
        let units = self.store.scroll(&filter, 10_000, 0).await.map_err(BackendError::Search)?;
        let indexed_unit_count = units.items.len();
        let average_importance = if indexed_unit_count == 0 {
            0.0
        } else {
            units.items.iter().map(|m| m.importance).sum::<f32>() / indexed_unit_count as f32
        };
        let files = self.store.get_indexed_files(project, 1, 0).await.map_err(BackendError::Search)?;
        let graph = self.load_dependency_graph(project).await?;

        Ok(DashboardStats {
            indexed_file_count: files.total,
            indexed_unit_count,
            average_importance,
            dependency_stats: graph.stats(),
        })
    }

    async fn get_recent_activity(&self, project: &str, limit: usize) -> Result<Vec<ActivityEntry>, BackendError> {
        let units = self.recent_code_units(project, limit).await?;
        Ok(units
            .into_iter()
            .map(|unit| ActivityEntry {
                file_path: unit.metadata_str(FILE_PATH_METADATA_KEY).unwrap_or("").to_string(),
                unit_name: unit.metadata_str(UNIT_NAME_METADATA_KEY).unwrap_or(&unit.id).to_string(),
                indexed_at: unit.updated_at,
                unit_id: unit.id,
            })
            .collect())
    }

    fn repo_id(&self) -> &str {
        &self.repo_id
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        self.store.health_check().await.map_err(BackendError::Search)
    }

    async fn check_provider(&self) -> Result<ProviderStatus, BackendError> {
        self.embeddings.check_status().await.map_err(BackendError::Search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_embedding_config_defaults_to_local() {
        let config = MindConfig::default();
        let embedding_config = LocalBackend::to_embedding_config(&config);
        assert!(matches!(
            embedding_config.provider,
            codemind_search::EmbeddingProviderType::Local
        ));
    }
}
