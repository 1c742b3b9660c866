//! Search command - Semantic, keyword, or hybrid code search

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use codemind_backend::Backend;
use codemind_search::SearchQuery;

use super::create_backend;
use crate::GlobalOptions;

/// Search mode
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SearchMode {
    /// Hybrid semantic + keyword search (default)
    Hybrid,
    /// Semantic search optimized for natural language queries
    Semantic,
    /// Keyword search optimized for identifiers
    Keyword,
}

impl SearchMode {
    fn to_search_mode(self) -> codemind_search::SearchMode {
        match self {
            SearchMode::Hybrid => codemind_search::SearchMode::Hybrid,
            SearchMode::Semantic => codemind_search::SearchMode::Semantic,
            SearchMode::Keyword => codemind_search::SearchMode::Keyword,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    query: String,

    /// Project to search within (omit to search all projects)
    #[arg(long)]
    project_name: Option<String>,

    /// Maximum number of results to return
    #[arg(long, short = 'n', default_value = "10")]
    limit: usize,

    /// Search mode: hybrid, semantic, or keyword
    #[arg(long, short = 'm', value_enum, default_value = "hybrid")]
    mode: SearchMode,

    /// Only return units with complexity >= this value
    #[arg(long)]
    min_complexity: Option<u32>,

    /// Only return units with complexity <= this value
    #[arg(long)]
    max_complexity: Option<u32>,

    /// Output format: text (default), json
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Execute the search command
pub async fn execute(args: SearchArgs, global: GlobalOptions) -> Result<()> {
    let backend = create_backend(&global).await?;

    let query = SearchQuery {
        project_name: args.project_name,
        limit: args.limit,
        search_mode: args.mode.to_search_mode(),
        min_complexity: args.min_complexity,
        max_complexity: args.max_complexity,
        ..SearchQuery::new()
    };

    let response = backend
        .search_code(&args.query, query)
        .await
        .context("Search failed")?;

    if response.results.is_empty() {
        if !global.quiet {
            eprintln!("No results found for: {}", args.query);
        }
        return Ok(());
    }

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response).context("Failed to serialize results")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !global.quiet {
                println!(
                    "Found {} result(s) for \"{}\" ({}):\n",
                    response.results.len(),
                    response.query,
                    response.interpretation
                );
            }

            for (i, result) in response.results.iter().enumerate() {
                let unit_name = result
                    .memory
                    .metadata
                    .get("unit_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&result.memory.id);
                let file_path = result
                    .memory
                    .metadata
                    .get("file_path")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<unknown>");

                println!("{}. {} ({})", i + 1, unit_name, file_path);
                println!("   score: {:.3}  relevance: {}", result.score, result.relevance);
                for line in result.memory.content.lines().take(5) {
                    println!("   {}", line);
                }
                println!();
            }

            if let Some(degraded) = response.degraded_to {
                eprintln!("(degraded to {} search)", degraded);
            }
        }
    }

    Ok(())
}
