//! Initialize command - Set up a workspace and run its first index

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use codemind_backend::Backend;

use super::{create_backend, default_project_name, load_config, print_info};
use crate::progress::{finish_spinner, finish_spinner_warn, spinner};
use crate::GlobalOptions;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Project name indexed units are scoped under (defaults to the directory name)
    #[arg(long)]
    project_name: Option<String>,

    /// Skip indexing after setup
    #[arg(long)]
    no_index: bool,

    /// CI/CD mode (equivalent to --quiet --no-index)
    #[arg(long)]
    ci: bool,
}

/// Execute the init command
pub async fn execute(args: InitArgs, global: GlobalOptions) -> Result<()> {
    let quiet = global.quiet || args.ci;
    let no_index = args.no_index || args.ci;

    let workspace_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()?.join(&args.path)
    };
    let workspace_path = workspace_path
        .canonicalize()
        .context("Failed to resolve workspace path")?;

    let config = load_config(&global, &workspace_path)?;
    let mind_dir = config.storage.mind_dir.clone();
    let local_config_dir = workspace_path.join(&mind_dir);

    print_info(
        &format!("Initializing CodeMind workspace at {}", workspace_path.display()),
        quiet,
    );

    if !local_config_dir.exists() {
        std::fs::create_dir_all(&local_config_dir).context("Failed to create .codemind directory")?;
        print_info(&format!("Created {}", local_config_dir.display()), quiet);
    }

    let local_config_path = local_config_dir.join("config.toml");
    if !local_config_path.exists() {
        let default_local = r#"# CodeMind local configuration
# This file overrides global settings for this workspace

[analysis]
# exclude_patterns = ["**/generated/**"]
"#;
        std::fs::write(&local_config_path, default_local).context("Failed to write local config")?;
        print_info(&format!("Created {}", local_config_path.display()), quiet);
    }

    let project_name = args
        .project_name
        .unwrap_or_else(|| default_project_name(&workspace_path));

    if !no_index {
        let pb = spinner("Indexing codebase for semantic search...", quiet);
        let backend = create_backend(&global).await?;
        match backend.index_codebase(&workspace_path, &project_name).await {
            Ok(stats) => {
                finish_spinner(
                    pb,
                    &format!(
                        "Indexed {} units across {} files",
                        stats.total_units, stats.indexed_files
                    ),
                );
            }
            Err(e) => {
                finish_spinner_warn(pb, "Indexing skipped");
                if !quiet {
                    eprintln!("  Warning: {}", e);
                    eprintln!("  You can index later with: codemind update --force");
                }
            }
        }
    }

    if !quiet {
        println!("\nWorkspace initialized successfully!");
        println!("\nNext steps:");
        println!("  codemind search \"your query\"   - Search the codebase");
        println!("  codemind status                 - Check workspace status");
        println!("  codemind mcp                     - Start the MCP server");
    }

    Ok(())
}
