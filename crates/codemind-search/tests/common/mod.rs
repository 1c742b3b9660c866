//! Common test utilities for codemind-search integration tests.
//!
//! Qdrant is optional: `memory_store()` points at an unreachable Qdrant URL
//! and relies on `create_memory_store`'s fallback to a local `KeywordStore`,
//! so these tests run without any external service.

use std::path::PathBuf;
use std::sync::Arc;

use codemind_search::{
    create_memory_store, embeddings::create_provider, DegradationTracker, EmbeddingConfig,
    EmbeddingGenerator, MemoryStore, QdrantConfig, StoreConfig,
};

/// Get path to codemind-core integration test fixtures
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("codemind-core")
        .join("tests")
        .join("fixtures")
        .join("integration_repos")
}

/// Generate a unique repo ID for test isolation
pub fn unique_repo_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    format!("{}_{}", prefix, timestamp)
}

/// Build a memory store (keyword-store fallback, no live Qdrant needed) and
/// a local no-network embedding generator.
pub async fn memory_store_and_embeddings() -> (Arc<dyn MemoryStore>, Arc<EmbeddingGenerator>) {
    let store_config = StoreConfig {
        qdrant: QdrantConfig::with_url("http://127.0.0.1:1"),
        ..Default::default()
    };
    let tracker = Arc::new(DegradationTracker::new());
    let store = create_memory_store(&store_config, true, &tracker)
        .await
        .expect("keyword-store fallback should succeed without Qdrant");

    let provider = create_provider(&EmbeddingConfig::local()).expect("local embedding provider");
    let embeddings = Arc::new(EmbeddingGenerator::new(provider, "local"));

    (store, embeddings)
}
