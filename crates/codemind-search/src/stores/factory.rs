//! Store Factory + DegradationTracker (C13).
//!
//! Picks the configured backend; on a vector-backend connection failure with
//! `allow_fallback=true`, degrades to the keyword backend and records why.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::client::{QdrantConfig, QdrantStore};
use crate::error::Result;
use crate::store::MemoryStore;

use super::keyword::KeywordStore;
use super::vector::VectorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Qdrant,
    Keyword,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StorageBackend,
    pub qdrant: QdrantConfig,
    pub keyword_db_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Qdrant,
            qdrant: QdrantConfig::default(),
            keyword_db_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DegradationRecord {
    pub component: String,
    pub message: String,
}

/// Process-wide log of degraded-but-recovered operations, deduped by
/// `(component, message)` so a repeated failure doesn't spam the surfaced
/// summary.
#[derive(Default)]
pub struct DegradationTracker {
    records: Mutex<Vec<DegradationRecord>>,
    seen: Mutex<HashSet<(String, String)>>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, component: impl Into<String>, message: impl Into<String>) {
        let component = component.into();
        let message = message.into();
        let key = (component.clone(), message.clone());

        let mut seen = self.seen.lock().unwrap();
        if seen.insert(key) {
            warn!(component = %component, "{}", message);
            self.records.lock().unwrap().push(DegradationRecord { component, message });
        }
    }

    pub fn has_degradations(&self) -> bool {
        !self.records.lock().unwrap().is_empty()
    }

    pub fn get_summary(&self) -> Vec<DegradationRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
        self.seen.lock().unwrap().clear();
    }
}

fn keyword_path(config: &StoreConfig) -> PathBuf {
    config
        .keyword_db_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("codemind_keyword_fallback.db"))
}

/// Creates the configured backend. On connection failure with
/// `allow_fallback=true`, degrades to the keyword backend and records the
/// reason on `tracker`; otherwise the connection error propagates.
pub async fn create_memory_store(
    config: &StoreConfig,
    allow_fallback: bool,
    tracker: &DegradationTracker,
) -> Result<Arc<dyn MemoryStore>> {
    match config.backend {
        StorageBackend::Keyword => {
            let store = KeywordStore::open(keyword_path(config))?;
            store.initialize().await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Qdrant => match QdrantStore::connect(config.qdrant.clone()).await {
            Ok(client) => {
                let store = VectorStore::new(client);
                store.initialize().await?;
                Ok(Arc::new(store))
            }
            Err(err) if allow_fallback => {
                tracker.record(
                    "vector_store",
                    format!("connection to vector backend failed, degrading to keyword store: {err}"),
                );
                let store = KeywordStore::open(keyword_path(config))?;
                store.initialize().await?;
                Ok(Arc::new(store))
            }
            Err(err) => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degradation_tracker_dedups_by_component_and_message() {
        let tracker = DegradationTracker::new();
        tracker.record("vector_store", "connection refused");
        tracker.record("vector_store", "connection refused");
        tracker.record("vector_store", "different message");

        assert_eq!(tracker.get_summary().len(), 2);
        assert!(tracker.has_degradations());
    }

    #[test]
    fn clear_resets_tracker() {
        let tracker = DegradationTracker::new();
        tracker.record("a", "b");
        tracker.clear();
        assert!(!tracker.has_degradations());
    }

    #[tokio::test]
    async fn keyword_backend_initializes_without_connecting_to_qdrant() {
        let config = StoreConfig {
            backend: StorageBackend::Keyword,
            keyword_db_path: None,
            ..Default::default()
        };
        let tracker = DegradationTracker::new();
        let store = create_memory_store(&config, false, &tracker).await.unwrap();
        assert!(store.health_check().await.unwrap());
    }
}
