//! Collection schema and payload shape for the vector store (C11).
//!
//! A single collection holds every `Memory` record (code units and
//! free-form notes alike); code-specific fields are carried as optional
//! payload keys, not a separate collection.

use qdrant_client::qdrant::Distance;
use serde::{Deserialize, Serialize};

use crate::memory::{ContextLevel, Memory};

pub mod collections {
    /// The single memories collection.
    pub const MEMORIES: &str = "memories";
}

/// Configuration for a vector collection.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub name: &'static str,
    pub dimension: u64,
    pub distance: Distance,
    pub description: &'static str,
}

impl CollectionConfig {
    /// Memories collection (D=768, decided in favor of the Jina
    /// code/semantic embedding dimension used throughout the embedding
    /// providers).
    pub const MEMORIES: CollectionConfig = CollectionConfig {
        name: collections::MEMORIES,
        dimension: 768,
        distance: Distance::Cosine,
        description: "Memory records: code units and free-form notes",
    };
}

/// Payload field names, matching the external vector-backend contract.
pub mod fields {
    pub const ID: &str = "id";
    pub const CONTENT: &str = "content";
    pub const CATEGORY: &str = "category";
    pub const CONTEXT_LEVEL: &str = "context_level";
    pub const SCOPE: &str = "scope";
    pub const PROJECT_NAME: &str = "project_name";
    pub const IMPORTANCE: &str = "importance";
    pub const EMBEDDING_MODEL: &str = "embedding_model";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const TAGS: &str = "tags";

    pub const FILE_PATH: &str = "file_path";
    pub const LANGUAGE: &str = "language";
    pub const UNIT_TYPE: &str = "unit_type";
    pub const UNIT_NAME: &str = "unit_name";
    pub const START_LINE: &str = "start_line";
    pub const END_LINE: &str = "end_line";
    pub const SIGNATURE: &str = "signature";
    pub const CYCLOMATIC_COMPLEXITY: &str = "cyclomatic_complexity";
    pub const LINE_COUNT: &str = "line_count";
    pub const NESTING_DEPTH: &str = "nesting_depth";
    pub const PARAMETER_COUNT: &str = "parameter_count";
    pub const HAS_DOCUMENTATION: &str = "has_documentation";
    pub const IMPORTS: &str = "imports";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const IMPORT_COUNT: &str = "import_count";
    pub const FILE_MODIFIED_AT: &str = "file_modified_at";
    pub const FILE_SIZE_BYTES: &str = "file_size_bytes";
    pub const INDEXED_AT: &str = "indexed_at";
}

/// A memory rendered into the vector-store's flat payload shape.
///
/// Code-unit metadata (populated by the incremental indexer) rides in
/// `metadata` on the in-process `Memory` and is flattened here on the way
/// in/out of the store.
pub fn memory_to_payload(memory: &Memory) -> serde_json::Value {
    use serde_json::json;

    let mut payload = json!({
        fields::ID: memory.id,
        fields::CONTENT: memory.content,
        fields::CATEGORY: memory.category,
        fields::CONTEXT_LEVEL: context_level_str(memory.context_level),
        fields::SCOPE: memory.scope,
        fields::PROJECT_NAME: memory.project_name,
        fields::IMPORTANCE: memory.importance,
        fields::EMBEDDING_MODEL: memory.embedding_model,
        fields::CREATED_AT: memory.created_at,
        fields::UPDATED_AT: memory.updated_at,
        fields::TAGS: memory.tags.iter().cloned().collect::<Vec<_>>(),
    });

    if let serde_json::Value::Object(map) = &mut payload {
        for (key, value) in &memory.metadata {
            map.insert(key.clone(), value.clone());
        }
    }

    payload
}

pub fn context_level_str(level: ContextLevel) -> &'static str {
    match level {
        ContextLevel::UserPreference => "USER_PREFERENCE",
        ContextLevel::ProjectContext => "PROJECT_CONTEXT",
        ContextLevel::SessionState => "SESSION_STATE",
    }
}

pub fn context_level_from_str(s: &str) -> ContextLevel {
    match s {
        "USER_PREFERENCE" => ContextLevel::UserPreference,
        "SESSION_STATE" => ContextLevel::SessionState,
        _ => ContextLevel::ProjectContext,
    }
}

/// Reassembles a `Memory` from a flat payload (the inverse of
/// [`memory_to_payload`]); unrecognized keys are kept as metadata.
pub fn payload_to_memory(payload: &serde_json::Map<String, serde_json::Value>) -> Memory {
    use std::collections::{HashMap, HashSet};

    const CORE_KEYS: &[&str] = &[
        fields::ID,
        fields::CONTENT,
        fields::CATEGORY,
        fields::CONTEXT_LEVEL,
        fields::SCOPE,
        fields::PROJECT_NAME,
        fields::IMPORTANCE,
        fields::EMBEDDING_MODEL,
        fields::CREATED_AT,
        fields::UPDATED_AT,
        fields::TAGS,
    ];

    let get_str = |k: &str| payload.get(k).and_then(|v| v.as_str()).unwrap_or("").to_string();
    let get_i64 = |k: &str| payload.get(k).and_then(|v| v.as_i64()).unwrap_or(0);

    let tags: HashSet<String> = payload
        .get(fields::TAGS)
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|t| t.as_str().map(String::from)).collect())
        .unwrap_or_default();

    let metadata: HashMap<String, serde_json::Value> = payload
        .iter()
        .filter(|(k, _)| !CORE_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Memory {
        id: get_str(fields::ID),
        content: get_str(fields::CONTENT),
        category: get_str(fields::CATEGORY),
        context_level: context_level_from_str(&get_str(fields::CONTEXT_LEVEL)),
        scope: get_str(fields::SCOPE),
        project_name: payload
            .get(fields::PROJECT_NAME)
            .and_then(|v| v.as_str())
            .map(String::from),
        importance: payload
            .get(fields::IMPORTANCE)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32,
        embedding_model: get_str(fields::EMBEDDING_MODEL),
        created_at: get_i64(fields::CREATED_AT),
        updated_at: get_i64(fields::UPDATED_AT),
        tags,
        metadata,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub memory: Memory,
    pub score: f32,
}
