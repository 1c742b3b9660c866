//! Integration tests for codemind-search.
//!
//! These run against the keyword-store fallback (`create_memory_store`'s
//! `allow_fallback` path on an unreachable Qdrant URL) and a local
//! no-network embedding provider, so no external service is required.
//!
//! ```bash
//! cargo test --package codemind-search --test integration
//! ```

mod common;

use codemind_search::{
    CodeSearchService, IncrementalIndexer, MemoryFilter, SearchMode, SearchQuery,
};

// ============================================================================
// Indexing Tests
// ============================================================================

#[tokio::test]
async fn test_index_fixture_directory() {
    let (store, embeddings) = common::memory_store_and_embeddings().await;
    let project = common::unique_repo_id("index_test");
    let fixture_path = common::fixtures_dir().join("rust");

    let indexer = IncrementalIndexer::new(store, embeddings, project.as_str());
    let stats = indexer
        .index_directory(&fixture_path, true, None, None)
        .await
        .expect("Failed to index directory");

    assert!(stats.indexed_files > 0, "Should index at least one file");
    assert!(stats.total_units > 0, "Should index at least one unit");
    assert!(stats.failed_files.is_empty(), "No files should fail to index");

    println!(
        "Indexed: {} files, {} units, {} skipped",
        stats.indexed_files, stats.total_units, stats.skipped_files
    );
}

#[tokio::test]
async fn test_reindex_cleans_stale_entries() {
    let (store, embeddings) = common::memory_store_and_embeddings().await;
    let project = common::unique_repo_id("reindex_test");
    let fixture_path = common::fixtures_dir().join("rust");

    let indexer = IncrementalIndexer::new(store.clone(), embeddings, project.as_str());
    let first = indexer
        .index_directory(&fixture_path, true, None, None)
        .await
        .expect("first index failed");
    assert!(first.total_units > 0);

    let deleted = indexer
        .delete_file_index(&fixture_path.join("sample.rs"))
        .await
        .expect("delete_file_index failed");
    assert!(deleted > 0, "Should delete the units for sample.rs");

    let filter = MemoryFilter {
        project_name: Some(project.clone()),
        ..Default::default()
    };
    let remaining = store.count(&filter).await.expect("count failed");
    assert_eq!(remaining, 0, "All units for the project should be gone");
}

// ============================================================================
// Search Tests
// ============================================================================

#[tokio::test]
async fn test_keyword_search_finds_calculator() {
    let (store, embeddings) = common::memory_store_and_embeddings().await;
    let project = common::unique_repo_id("search_test");
    let fixture_path = common::fixtures_dir().join("rust");

    let indexer = IncrementalIndexer::new(store.clone(), embeddings.clone(), project.as_str());
    let stats = indexer
        .index_directory(&fixture_path, true, None, None)
        .await
        .expect("index failed");
    assert!(stats.total_units > 0);

    let search = CodeSearchService::new(store, embeddings);
    let query = SearchQuery {
        project_name: Some(project),
        search_mode: SearchMode::Keyword,
        ..SearchQuery::new()
    };
    let response = search
        .search_code("SimpleCalculator", query)
        .await
        .expect("search failed");

    assert!(
        !response.results.is_empty(),
        "Should find results for 'SimpleCalculator'"
    );
    let found = response.results.iter().any(|r| r.memory.content.contains("SimpleCalculator"));
    assert!(found, "Expected a result mentioning SimpleCalculator");
}

#[tokio::test]
async fn test_project_scoping_isolates_results() {
    let (store, embeddings) = common::memory_store_and_embeddings().await;
    let project_a = common::unique_repo_id("proj_a");
    let project_b = common::unique_repo_id("proj_b");
    let fixture_path = common::fixtures_dir().join("rust");

    let indexer_a = IncrementalIndexer::new(store.clone(), embeddings.clone(), project_a.as_str());
    indexer_a
        .index_directory(&fixture_path, true, None, None)
        .await
        .expect("index a failed");

    let search = CodeSearchService::new(store, embeddings);

    let query_b = SearchQuery {
        project_name: Some(project_b),
        search_mode: SearchMode::Keyword,
        ..SearchQuery::new()
    };
    let response_b = search
        .search_code("SimpleCalculator", query_b)
        .await
        .expect("search failed");

    assert!(
        response_b.results.is_empty(),
        "A query scoped to an unindexed project should return no results"
    );
}
