//! CodeMind Search - Semantic code memory and search over Qdrant/SQLite
//!
//! This crate provides the storage, analysis, and retrieval layer of the
//! semantic code memory service:
//! - A generalized `Memory` record model (code units and free-form notes)
//! - Pluggable vector (Qdrant) and keyword (SQLite) stores behind a single
//!   `MemoryStore` trait, with automatic degradation between them
//! - Complexity/usage/criticality/importance/quality analyzers
//! - An incremental indexer orchestrating parse -> embed -> store
//! - A hybrid/pattern-aware code search service

pub mod analysis;
pub mod client;
pub mod embeddings;
pub mod error;
pub mod indexer;
pub mod memory;
pub mod pattern;
pub mod schema;
pub mod search_service;
pub mod store;
pub mod stores;

// Re-export jina_bert_v2 from embeddings for backward compatibility
pub use embeddings::jina_bert_v2;

// Re-exports for convenience
pub use client::{point_id_for, QdrantConfig, QdrantStore};
pub use error::{Result, SearchError};
pub use indexer::{FileIndexResult, IncrementalIndexer, IndexStats, ProgressCallback};
pub use pattern::{PatternMatch, PatternMatchLocation, PatternMode};
pub use schema::{memory_to_payload, payload_to_memory, CollectionConfig, SearchHit};
pub use search_service::{CodeSearchService, SearchMode, SearchQuery, SearchResponse, SearchResultItem};
pub use store::{MemoryStore, ScoredMemory};
pub use stores::{create_memory_store, DegradationRecord, DegradationTracker, KeywordStore, StoreConfig, VectorStore};

// Re-export embedding provider abstraction types
pub use embeddings::{
    create_provider, validate_dimension, AzureMLAuth, AzureMLConfig, AzureMLProvider, CacheStats,
    EmbeddingCache, EmbeddingConfig, EmbeddingGenerator, EmbeddingProvider, EmbeddingProviderType,
    EmptyInputError, LocalProvider, OpenAIConfig, OpenAIProvider, ProviderStatus, EXPECTED_DIM,
};

// Re-export analysis (C4-C8) types
pub use analysis::{
    CodeQualityMetrics, ComplexityAnalyzer, ComplexityMetrics, CriticalityAnalyzer,
    ImportancePreset, ImportanceScorer, ImportanceWeights, QualityAnalyzer, QualityHotspot,
    SummaryStatistics, UsageAnalyzer,
};

// Re-export the shared memory record model (§3)
pub use memory::{ContextLevel, Memory, MemoryFilter, MemoryPatch, Page};
