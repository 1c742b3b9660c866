//! Shared types for backend operations not already modeled by
//! `codemind_search` (which supplies `Memory`, `SearchQuery`, `SearchResponse`,
//! `IndexStats` directly).

use serde::{Deserialize, Serialize};

use codemind_core::DependencyStats;

/// Snapshot returned by `get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendStatus {
    pub repo_id: String,
    pub storage_backend: String,
    pub degraded: bool,
    pub degradation_summary: Vec<String>,
    pub indexed_file_count: usize,
    pub indexed_unit_count: usize,
}

/// Snapshot returned by `get_dashboard_stats`, combining index size with
/// dependency-graph shape for the current project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub indexed_file_count: usize,
    pub indexed_unit_count: usize,
    pub average_importance: f32,
    pub dependency_stats: DependencyStats,
}

/// A single entry in the `get_recent_activity` feed: the most recently
/// indexed units for a project, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub unit_id: String,
    pub file_path: String,
    pub unit_name: String,
    pub indexed_at: i64,
}
