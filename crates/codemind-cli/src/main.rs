//! CodeMind CLI - Semantic code memory and search
//!
//! A command-line interface for indexing a codebase, searching it
//! semantically, inspecting its dependency graph, and running the MCP
//! server for AI assistant integration.
//!
//! # Usage
//!
//! ```bash
//! # Initialize and index a workspace
//! codemind init
//!
//! # Search for code patterns
//! codemind search "authentication logic"
//!
//! # Show status
//! codemind status
//!
//! # Start the MCP server
//! codemind mcp
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod progress;

/// CodeMind - Semantic code memory and search
#[derive(Parser, Debug)]
#[command(name = "codemind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Workspace to operate on (path; defaults to the current directory)
    #[arg(long, short = 'w', global = true, env = "CODEMIND_WORKSPACE")]
    workspace: Option<String>,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "CODEMIND_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Qdrant server URL
    #[arg(
        long,
        global = true,
        env = "CODEMIND_QDRANT_URL",
        default_value = "http://localhost:6334"
    )]
    qdrant_url: String,

    /// Embedding provider type (local, azure-ml, openai)
    #[arg(long, global = true, env = "CODEMIND_EMBEDDING_PROVIDER", value_parser = parse_embedding_provider)]
    embedding_provider: Option<codemind_config::EmbeddingProviderType>,
}

/// Parse embedding provider from string
fn parse_embedding_provider(s: &str) -> Result<codemind_config::EmbeddingProviderType, String> {
    s.parse()
        .map_err(|e: codemind_config::ConfigError| e.to_string())
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> codemind_config::ConfigOverrides {
        codemind_config::ConfigOverrides {
            qdrant_url: Some(self.qdrant_url.clone()),
            embedding_provider: self.embedding_provider,
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a workspace and run its first index
    Init(commands::init::InitArgs),

    /// (Re)index a workspace
    Update(commands::update::UpdateArgs),

    /// Search the codebase semantically, by keyword, or both
    Search(commands::search::SearchArgs),

    /// Show backend health and a project's index/dependency stats
    Status(commands::status::StatusArgs),

    /// Start the MCP server for AI assistant integration
    Mcp(commands::mcp::McpArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // MCP command handles its own tracing setup (needs ansi=false for JSON-RPC protocol,
    // and must gracefully handle pre-existing subscribers when launched by Claude Code)
    if !matches!(cli.command, Commands::Mcp(_)) {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.global).await,
        Commands::Update(args) => commands::update::execute(args, cli.global).await,
        Commands::Search(args) => commands::search::execute(args, cli.global).await,
        Commands::Status(args) => commands::status::execute(args, cli.global).await,
        Commands::Mcp(args) => commands::mcp::execute(args, cli.global).await,
    }
}
