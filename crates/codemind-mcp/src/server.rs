//! CodeMind MCP Server implementation
//!
//! This module implements the MCP server using the rmcp SDK, exposing the
//! full memory/search/index/dependency RPC surface as MCP tools:
//! - Memory (store_memory, retrieve_memories, delete_memory)
//! - Status (get_status)
//! - Code search (search_code, find_similar_code)
//! - Indexing (index_codebase, reindex_project, get_indexed_files, list_indexed_units)
//! - Dependency graph (get_file_dependencies, get_file_dependents, find_dependency_path, get_dependency_stats)
//! - Dashboard (get_dashboard_stats, get_recent_activity)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use tracing::{debug, info};

use codemind_backend::{Backend, LocalBackend};
use codemind_config::MindConfig;
use codemind_search::{Memory, MemoryFilter, SearchMode, SearchQuery};

use crate::tools::*;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the repository/workspace root
    pub repo_path: PathBuf,
    /// CodeMind configuration (embedding provider, Qdrant, thresholds, ...)
    pub config: MindConfig,
    /// Repository/project identifier used to scope stored memories
    pub repo_id: String,
    /// Reject write operations (store/delete/index/reindex) when set
    pub read_only: bool,
}

impl ServerConfig {
    /// Create config with default `MindConfig` settings.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        let repo_path = repo_path.into();
        let repo_id = repo_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "default".to_string());

        Self {
            repo_path,
            config: MindConfig::default(),
            repo_id,
            read_only: false,
        }
    }

    /// Set custom repo ID
    pub fn with_repo_id(mut self, repo_id: impl Into<String>) -> Self {
        self.repo_id = repo_id.into();
        self
    }

    /// Set Qdrant URL
    pub fn with_qdrant_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.qdrant.url = url.into();
        self
    }

    /// Open the server read-only
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

fn generate_memory_id(content: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(nanos.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

fn parse_context_level(s: &str) -> Result<codemind_search::ContextLevel, McpError> {
    use codemind_search::ContextLevel;
    match s {
        "user_preference" => Ok(ContextLevel::UserPreference),
        "project_context" => Ok(ContextLevel::ProjectContext),
        "session_state" => Ok(ContextLevel::SessionState),
        other => Err(McpError::invalid_params(
            format!("unknown context_level: {other}"),
            None,
        )),
    }
}

fn parse_search_mode(s: &str) -> Result<SearchMode, McpError> {
    s.parse()
        .map_err(|e: codemind_search::SearchError| McpError::invalid_params(e.to_string(), None))
}

fn ok_json(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&value).unwrap_or_default(),
    )]))
}

fn backend_err(e: codemind_backend::BackendError) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

/// CodeMind MCP Server exposing memory, search, index, and dependency tools
#[derive(Clone)]
pub struct MindServer {
    backend: Arc<dyn Backend>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MindServer {
    /// Create a new server instance
    pub async fn new(config: ServerConfig) -> Result<Self, crate::McpError> {
        info!("Initializing CodeMind MCP server");
        info!("  Repository: {}", config.repo_path.display());
        info!("  Repo id: {}", config.repo_id);

        let mut backend = LocalBackend::with_repo_id(&config.config, &config.repo_path, &config.repo_id).await?;
        if config.read_only {
            backend = backend.read_only();
        }

        Ok(Self {
            backend: Arc::new(backend),
            tool_router: Self::tool_router(),
        })
    }

    // =========================================================================
    // Memory tools
    // =========================================================================

    #[tool(
        name = "store_memory",
        description = "Remember a piece of free-form text (a preference, a decision, a note). Returns the memory's id."
    )]
    pub async fn store_memory(
        &self,
        Parameters(params): Parameters<StoreMemoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = generate_memory_id(&params.content);
        let mut memory = Memory::new(id, params.content);
        memory.category = "note".to_string();
        memory.project_name = params.project_name;
        if let Some(level) = params.context_level {
            memory.context_level = parse_context_level(&level)?;
        }
        if let Some(importance) = params.importance {
            memory.importance = importance.clamp(0.0, 1.0);
        }
        if let Some(tags) = params.tags {
            memory.tags = tags.into_iter().collect();
        }

        let id = self.backend.store_memory(memory).await.map_err(backend_err)?;
        ok_json(serde_json::json!({ "id": id }))
    }

    #[tool(
        name = "retrieve_memories",
        description = "List stored memories matching a project/category/tag/importance filter."
    )]
    pub async fn retrieve_memories(
        &self,
        Parameters(params): Parameters<RetrieveMemoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let filter = MemoryFilter {
            project_name: params.project_name,
            category: params.category,
            tags: params.tags.unwrap_or_default(),
            min_importance: params.min_importance,
            ..Default::default()
        };
        let limit = params.limit.unwrap_or(20);
        let offset = params.offset.unwrap_or(0);

        let page = self
            .backend
            .retrieve_memories(filter, limit, offset)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(page).unwrap_or_default())
    }

    #[tool(name = "delete_memory", description = "Delete a stored memory by id.")]
    pub async fn delete_memory(
        &self,
        Parameters(params): Parameters<DeleteMemoryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.backend.delete_memory(&params.id).await.map_err(backend_err)?;
        ok_json(serde_json::json!({ "deleted": params.id }))
    }

    // =========================================================================
    // Status
    // =========================================================================

    #[tool(
        name = "get_status",
        description = "Backend health: storage backend in use, degradation state, and index size."
    )]
    pub async fn get_status(
        &self,
        Parameters(_params): Parameters<GetStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let status = self.backend.get_status().await.map_err(backend_err)?;
        ok_json(serde_json::to_value(status).unwrap_or_default())
    }

    // =========================================================================
    // Code search
    // =========================================================================

    #[tool(
        name = "search_code",
        description = "Search indexed code by identifier, phrase, or concept. Supports semantic/keyword/hybrid modes, complexity filters, and pattern matching (e.g. @preset:todo_fixme)."
    )]
    pub async fn search_code(
        &self,
        Parameters(params): Parameters<SearchCodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let search_mode = match params.search_mode {
            Some(ref mode) => parse_search_mode(mode)?,
            None => SearchMode::default(),
        };

        let query_params = SearchQuery {
            project_name: params.project_name,
            limit: params.limit.unwrap_or(5),
            search_mode,
            min_complexity: params.min_complexity,
            max_complexity: params.max_complexity,
            pattern: params.pattern,
            pattern_mode: params.pattern_mode,
            ..SearchQuery::new()
        };

        let response = self
            .backend
            .search_code(&params.query, query_params)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(response).unwrap_or_default())
    }

    #[tool(
        name = "find_similar_code",
        description = "Find code similar to an already-indexed unit, by its id."
    )]
    pub async fn find_similar_code(
        &self,
        Parameters(params): Parameters<FindSimilarCodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .backend
            .find_similar_code(&params.unit_id, params.limit.unwrap_or(5))
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(response).unwrap_or_default())
    }

    // =========================================================================
    // Indexing
    // =========================================================================

    #[tool(
        name = "index_codebase",
        description = "Walk a directory tree and index it (incrementally, reusing unchanged files' embeddings)."
    )]
    pub async fn index_codebase(
        &self,
        Parameters(params): Parameters<IndexCodebaseParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("index_codebase: root={}, project={}", params.root, params.project_name);
        let stats = self
            .backend
            .index_codebase(std::path::Path::new(&params.root), &params.project_name)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(stats).unwrap_or_default())
    }

    #[tool(
        name = "reindex_project",
        description = "Delete a project's indexed units and re-index its root directory from scratch."
    )]
    pub async fn reindex_project(
        &self,
        Parameters(params): Parameters<ReindexProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let stats = self
            .backend
            .reindex_project(std::path::Path::new(&params.root), &params.project_name)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(stats).unwrap_or_default())
    }

    #[tool(name = "get_indexed_files", description = "List the distinct files indexed for a project.")]
    pub async fn get_indexed_files(
        &self,
        Parameters(params): Parameters<GetIndexedFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = self
            .backend
            .get_indexed_files(&params.project_name, params.limit.unwrap_or(100), params.offset.unwrap_or(0))
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(page).unwrap_or_default())
    }

    #[tool(
        name = "list_indexed_units",
        description = "List indexed code units for a project, optionally scoped to one file."
    )]
    pub async fn list_indexed_units(
        &self,
        Parameters(params): Parameters<ListIndexedUnitsParams>,
    ) -> Result<CallToolResult, McpError> {
        let page = self
            .backend
            .list_indexed_units(
                &params.project_name,
                params.file_path.as_deref(),
                params.limit.unwrap_or(50),
                params.offset.unwrap_or(0),
            )
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(page).unwrap_or_default())
    }

    // =========================================================================
    // Dependency graph
    // =========================================================================

    #[tool(
        name = "get_file_dependencies",
        description = "Files that a given file imports (within the indexed project)."
    )]
    pub async fn get_file_dependencies(
        &self,
        Parameters(params): Parameters<GetFileDependenciesParams>,
    ) -> Result<CallToolResult, McpError> {
        let deps = self
            .backend
            .get_file_dependencies(&params.project_name, &params.file_path)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::json!({ "dependencies": deps }))
    }

    #[tool(
        name = "get_file_dependents",
        description = "Files that import a given file (within the indexed project)."
    )]
    pub async fn get_file_dependents(
        &self,
        Parameters(params): Parameters<GetFileDependentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let dependents = self
            .backend
            .get_file_dependents(&params.project_name, &params.file_path)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::json!({ "dependents": dependents }))
    }

    #[tool(
        name = "find_dependency_path",
        description = "Shortest import-edge path between two files, if any exists."
    )]
    pub async fn find_dependency_path(
        &self,
        Parameters(params): Parameters<FindDependencyPathParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self
            .backend
            .find_dependency_path(&params.project_name, &params.from, &params.to)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::json!({ "path": path }))
    }

    #[tool(
        name = "get_dependency_stats",
        description = "Dependency-graph shape for a project: file/edge counts, cycle presence, most-depended-on files."
    )]
    pub async fn get_dependency_stats(
        &self,
        Parameters(params): Parameters<GetDependencyStatsParams>,
    ) -> Result<CallToolResult, McpError> {
        let stats = self
            .backend
            .get_dependency_stats(&params.project_name)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(stats).unwrap_or_default())
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    #[tool(
        name = "get_dashboard_stats",
        description = "Combined index-size and dependency-graph snapshot for a project."
    )]
    pub async fn get_dashboard_stats(
        &self,
        Parameters(params): Parameters<GetDashboardStatsParams>,
    ) -> Result<CallToolResult, McpError> {
        let stats = self
            .backend
            .get_dashboard_stats(&params.project_name)
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(stats).unwrap_or_default())
    }

    #[tool(
        name = "get_recent_activity",
        description = "The most recently indexed code units for a project, newest first."
    )]
    pub async fn get_recent_activity(
        &self,
        Parameters(params): Parameters<GetRecentActivityParams>,
    ) -> Result<CallToolResult, McpError> {
        let activity = self
            .backend
            .get_recent_activity(&params.project_name, params.limit.unwrap_or(20))
            .await
            .map_err(backend_err)?;
        ok_json(serde_json::to_value(activity).unwrap_or_default())
    }
}

// Implement ServerHandler for tool routing
#[tool_handler]
impl rmcp::ServerHandler for MindServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "CodeMind: semantic code memory and search for AI assistants.\n\n\
                TOOLS:\n\
                - store_memory / retrieve_memories / delete_memory: free-form memory\n\
                - get_status: backend health and index size\n\
                - search_code / find_similar_code: semantic/keyword/hybrid code search\n\
                - index_codebase / reindex_project: (re)index a directory tree\n\
                - get_indexed_files / list_indexed_units: inspect what's indexed\n\
                - get_file_dependencies / get_file_dependents / find_dependency_path / get_dependency_stats: import graph\n\
                - get_dashboard_stats / get_recent_activity: project overview\n\n\
                WORKFLOW: index_codebase -> search_code -> get_file_dependencies/find_similar_code"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
