//! Update command - (Re)index a workspace

use anyhow::{Context, Result};
use clap::Args;
use codemind_backend::Backend;

use super::{create_backend, default_project_name, resolve_workspace};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project name to (re)index (defaults to the workspace directory name)
    #[arg(long)]
    project_name: Option<String>,

    /// Delete the project's existing index and rebuild from scratch
    #[arg(long, short = 'f')]
    force: bool,
}

/// Execute the update command
pub async fn execute(args: UpdateArgs, global: GlobalOptions) -> Result<()> {
    let workspace_path = resolve_workspace(&global)?;
    let project_name = args
        .project_name
        .unwrap_or_else(|| default_project_name(&workspace_path));

    let backend = create_backend(&global).await?;

    let msg = if args.force {
        "Rebuilding index from scratch..."
    } else {
        "Updating index incrementally..."
    };
    let pb = spinner(msg, global.quiet);

    let stats = if args.force {
        backend
            .reindex_project(&workspace_path, &project_name)
            .await
            .context("Failed to reindex project")?
    } else {
        backend
            .index_codebase(&workspace_path, &project_name)
            .await
            .context("Failed to index project")?
    };

    finish_spinner(
        pb,
        &format!(
            "Indexed {} units across {} files ({} skipped, {} failed)",
            stats.total_units,
            stats.indexed_files,
            stats.skipped_files,
            stats.failed_files.len()
        ),
    );

    if !global.quiet {
        for failure in &stats.failed_files {
            eprintln!("  failed: {} ({})", failure.file_path, failure.error);
        }
        println!("\nUpdate complete!");
    }

    Ok(())
}
