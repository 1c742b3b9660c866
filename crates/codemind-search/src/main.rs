//! CodeMind Search CLI - standalone indexing and querying against a single
//! project, independent of the MCP/backend surface.
//!
//! Commands:
//! - `index` - Walk a directory and index it into the configured store
//! - `search` - Run a search query against an already-indexed project

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use codemind_search::{
    create_memory_store, embeddings::create_provider, CodeSearchService, DegradationTracker,
    EmbeddingConfig, EmbeddingGenerator, IncrementalIndexer, QdrantConfig, SearchMode, SearchQuery,
    StoreConfig,
};

#[derive(Parser)]
#[command(name = "codemind-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a directory tree into the configured store
    Index {
        /// Root directory to index
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Project name the indexed units are scoped under
        #[arg(short, long)]
        project: String,

        /// Qdrant server URL
        #[arg(long, default_value = "http://localhost:6334", env = "CODEMIND_QDRANT_URL")]
        qdrant_url: String,

        /// Max files indexed concurrently
        #[arg(long, default_value = "4")]
        max_concurrent: usize,
    },

    /// Search an already-indexed project
    Search {
        query: String,

        #[arg(short, long)]
        project: Option<String>,

        #[arg(long, default_value = "http://localhost:6334", env = "CODEMIND_QDRANT_URL")]
        qdrant_url: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,

        #[arg(short, long, default_value = "hybrid")]
        mode: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Index {
            root,
            project,
            qdrant_url,
            max_concurrent,
        } => cmd_index(root, project, qdrant_url, max_concurrent).await,
        Commands::Search {
            query,
            project,
            qdrant_url,
            limit,
            mode,
        } => cmd_search(query, project, qdrant_url, limit, mode).await,
    }
}

async fn make_embeddings() -> Result<Arc<EmbeddingGenerator>> {
    let provider = create_provider(&EmbeddingConfig::local()).context("failed to create embedding provider")?;
    Ok(Arc::new(EmbeddingGenerator::new(provider, "local")))
}

async fn cmd_index(root: PathBuf, project: String, qdrant_url: String, max_concurrent: usize) -> Result<()> {
    let store_config = StoreConfig {
        qdrant: QdrantConfig::with_url(qdrant_url),
        ..Default::default()
    };
    let tracker = DegradationTracker::new();
    let store = create_memory_store(&store_config, true, &tracker)
        .await
        .context("failed to create store")?;
    if tracker.has_degradations() {
        println!("warning: degraded to keyword store: {:?}", tracker.get_summary());
    }

    let embeddings = make_embeddings().await?;
    let indexer = IncrementalIndexer::new(store, embeddings, project).with_max_concurrent(max_concurrent);

    println!("Indexing {}...", root.display());
    let start = Instant::now();
    let stats = indexer.index_directory(&root, true, Some(max_concurrent), None).await?;
    println!(
        "Indexed {}/{} files, {} units, {} skipped, {} failed, {} stale cleaned, in {:.2}s",
        stats.indexed_files,
        stats.total_files,
        stats.total_units,
        stats.skipped_files,
        stats.failed_files.len(),
        stats.cleaned_entries,
        start.elapsed().as_secs_f64()
    );
    for failure in &stats.failed_files {
        println!("  failed: {} ({})", failure.file_path, failure.error);
    }

    Ok(())
}

async fn cmd_search(query: String, project: Option<String>, qdrant_url: String, limit: usize, mode: String) -> Result<()> {
    let store_config = StoreConfig {
        qdrant: QdrantConfig::with_url(qdrant_url),
        ..Default::default()
    };
    let tracker = DegradationTracker::new();
    let store = create_memory_store(&store_config, true, &tracker)
        .await
        .context("failed to create store")?;

    let embeddings = make_embeddings().await?;
    let service = CodeSearchService::new(store, embeddings);

    let search_mode: SearchMode = mode.parse().context("invalid search mode")?;
    let params = SearchQuery {
        project_name: project,
        limit,
        search_mode,
        ..SearchQuery::new()
    };

    let start = Instant::now();
    let response = service.search_code(&query, params).await?;
    let elapsed = start.elapsed();

    println!(
        "Search: \"{}\" ({} results in {:.0}ms, quality={})",
        response.query,
        response.results.len(),
        elapsed.as_millis(),
        response.quality
    );
    println!("{}\n", response.interpretation);

    for (i, item) in response.results.iter().enumerate() {
        println!(
            "{}. {} (score={:.3}, relevance={})",
            i + 1,
            item.memory.metadata_str("unit_name").unwrap_or(&item.memory.id),
            item.score,
            item.relevance
        );
        if let Some(path) = item.memory.metadata_str("file_path") {
            println!("   {}", path);
        }
    }

    Ok(())
}
