//! Memory record: the generalization of a code `Unit` plus free-form notes.
//!
//! A code unit is stored as a `Memory` with `category="code"`, `scope="project"`,
//! and `metadata` carrying the unit's file/range/signature/metrics fields.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub const CATEGORY_CODE: &str = "code";
pub const SCOPE_GLOBAL: &str = "global";
pub const SCOPE_PROJECT: &str = "project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextLevel {
    UserPreference,
    ProjectContext,
    SessionState,
}

impl Default for ContextLevel {
    fn default() -> Self {
        Self::ProjectContext
    }
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A generalized memory record (§3 Memory Record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    pub category: String,
    pub context_level: ContextLevel,
    pub scope: String,
    pub project_name: Option<String>,
    pub importance: f32,
    pub embedding_model: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub tags: HashSet<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Memory {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_unix();
        Self {
            id: id.into(),
            content: content.into(),
            category: CATEGORY_CODE.to_string(),
            context_level: ContextLevel::ProjectContext,
            scope: SCOPE_PROJECT.to_string(),
            project_name: None,
            importance: 0.5,
            embedding_model: String::new(),
            created_at: now,
            updated_at: now,
            tags: HashSet::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(|v| v.as_f64())
    }

    pub fn metadata_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(|v| v.as_u64())
    }

    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(|v| v.as_bool())
    }
}

/// Filter honored by both the vector and keyword stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    pub scope: Option<String>,
    pub project_name: Option<String>,
    pub category: Option<String>,
    pub context_level: Option<ContextLevel>,
    /// All-of: every tag listed must be present on the memory.
    pub tags: Vec<String>,
    pub min_importance: Option<f32>,
}

impl MemoryFilter {
    pub fn matches(&self, memory: &Memory) -> bool {
        if let Some(scope) = &self.scope {
            if &memory.scope != scope {
                return false;
            }
        }
        if let Some(project) = &self.project_name {
            if memory.project_name.as_deref() != Some(project.as_str()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &memory.category != category {
                return false;
            }
        }
        if let Some(level) = self.context_level {
            if memory.context_level != level {
                return false;
            }
        }
        if !self
            .tags
            .iter()
            .all(|tag| memory.tags.contains(tag.as_str()))
        {
            return false;
        }
        if let Some(min) = self.min_importance {
            if memory.importance < min {
                return false;
            }
        }
        true
    }
}

/// A partial update applied to an existing memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub importance: Option<f32>,
    pub tags: Option<HashSet<String>>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl MemoryPatch {
    pub fn apply(&self, memory: &mut Memory) {
        if let Some(content) = &self.content {
            memory.content = content.clone();
        }
        if let Some(importance) = self.importance {
            memory.importance = importance;
        }
        if let Some(tags) = &self.tags {
            memory.tags = tags.clone();
        }
        if let Some(metadata) = &self.metadata {
            memory.metadata.extend(metadata.clone());
        }
        memory.updated_at = now_unix();
    }
}

/// A page of results with a `has_more` envelope, used by `get_indexed_files`
/// and `list_indexed_units`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        let has_more = offset + items.len() < total;
        Self {
            items,
            total,
            limit,
            offset,
            has_more,
        }
    }
}
