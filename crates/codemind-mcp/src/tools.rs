//! MCP Tool parameter definitions
//!
//! These structs define the JSON Schema for tool parameters using schemars.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

/// Parameters for store_memory tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreMemoryParams {
    #[schemars(description = "Free-form text content to remember")]
    pub content: String,
    #[schemars(description = "Project this memory is scoped to (omit for a global memory)")]
    pub project_name: Option<String>,
    #[schemars(description = "Context level: user_preference, project_context (default), session_state")]
    pub context_level: Option<String>,
    #[schemars(description = "Importance in [0,1] (default 0.5)")]
    pub importance: Option<f32>,
    #[schemars(description = "Tags to attach")]
    pub tags: Option<Vec<String>>,
}

/// Parameters for retrieve_memories tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveMemoriesParams {
    #[schemars(description = "Project name filter")]
    pub project_name: Option<String>,
    #[schemars(description = "Category filter (e.g. \"code\" or \"note\")")]
    pub category: Option<String>,
    #[schemars(description = "All-of tag filter")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Minimum importance in [0,1]")]
    pub min_importance: Option<f32>,
    #[schemars(description = "Maximum results to return (default 20)")]
    pub limit: Option<usize>,
    #[schemars(description = "Result offset for pagination (default 0)")]
    pub offset: Option<usize>,
}

/// Parameters for delete_memory tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteMemoryParams {
    #[schemars(description = "Id of the memory to delete")]
    pub id: String,
}

/// Parameters for get_status tool (no params needed)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetStatusParams {}

/// Parameters for search_code tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchCodeParams {
    #[schemars(description = "Search query (identifier, phrase, or concept)")]
    pub query: String,
    #[schemars(description = "Project to search within (omit to search all projects)")]
    pub project_name: Option<String>,
    #[schemars(description = "Maximum results to return (default 5)")]
    pub limit: Option<usize>,
    #[schemars(description = "Search mode: semantic, keyword, or hybrid (default)")]
    pub search_mode: Option<String>,
    #[schemars(description = "Only return units with complexity >= this value")]
    pub min_complexity: Option<u32>,
    #[schemars(description = "Only return units with complexity <= this value")]
    pub max_complexity: Option<u32>,
    #[schemars(description = "Pattern preset (e.g. \"@preset:todo_fixme\") or a raw regex")]
    pub pattern: Option<String>,
    #[schemars(description = "Pattern mode: filter, require, or boost")]
    pub pattern_mode: Option<String>,
}

/// Parameters for find_similar_code tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindSimilarCodeParams {
    #[schemars(description = "Id of an already-indexed code unit to find similar code for")]
    pub unit_id: String,
    #[schemars(description = "Maximum results to return (default 5)")]
    pub limit: Option<usize>,
}

/// Parameters for index_codebase tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexCodebaseParams {
    #[schemars(description = "Root directory to index")]
    pub root: String,
    #[schemars(description = "Project name the indexed units are scoped under")]
    pub project_name: String,
}

/// Parameters for reindex_project tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReindexProjectParams {
    #[schemars(description = "Root directory to re-index")]
    pub root: String,
    #[schemars(description = "Project name to delete and re-index")]
    pub project_name: String,
}

/// Parameters for get_indexed_files tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetIndexedFilesParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
    #[schemars(description = "Maximum files to return (default 100)")]
    pub limit: Option<usize>,
    #[schemars(description = "Result offset for pagination (default 0)")]
    pub offset: Option<usize>,
}

/// Parameters for list_indexed_units tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListIndexedUnitsParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
    #[schemars(description = "Restrict to units from this file path")]
    pub file_path: Option<String>,
    #[schemars(description = "Maximum units to return (default 50)")]
    pub limit: Option<usize>,
    #[schemars(description = "Result offset for pagination (default 0)")]
    pub offset: Option<usize>,
}

/// Parameters for get_file_dependencies tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetFileDependenciesParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
    #[schemars(description = "File path to find dependencies of")]
    pub file_path: String,
}

/// Parameters for get_file_dependents tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetFileDependentsParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
    #[schemars(description = "File path to find dependents of")]
    pub file_path: String,
}

/// Parameters for find_dependency_path tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindDependencyPathParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
    #[schemars(description = "Source file path")]
    pub from: String,
    #[schemars(description = "Target file path")]
    pub to: String,
}

/// Parameters for get_dependency_stats tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDependencyStatsParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
}

/// Parameters for get_dashboard_stats tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDashboardStatsParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
}

/// Parameters for get_recent_activity tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetRecentActivityParams {
    #[schemars(description = "Project name")]
    pub project_name: String,
    #[schemars(description = "Maximum entries to return (default 20)")]
    pub limit: Option<usize>,
}
