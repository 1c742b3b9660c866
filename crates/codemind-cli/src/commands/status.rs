//! Status command - Show backend health and, optionally, a project's index stats

use anyhow::Result;
use clap::Args;
use codemind_backend::Backend;

use super::{create_backend, default_project_name, load_config, resolve_workspace};
use crate::GlobalOptions;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project name to show dashboard stats for (defaults to the workspace directory name)
    #[arg(long)]
    project_name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, global: GlobalOptions) -> Result<()> {
    let workspace_path = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace_path)?;
    let project_name = args
        .project_name
        .unwrap_or_else(|| default_project_name(&workspace_path));

    let backend = create_backend(&global).await?;
    let status = backend.get_status().await;
    let dashboard = backend.get_dashboard_stats(&project_name).await;

    if args.json {
        let mut report = serde_json::json!({
            "workspace_path": workspace_path,
            "qdrant_url": config.backend.qdrant.url,
            "project_name": project_name,
        });

        if let Ok(ref status) = status {
            report["backend"] = serde_json::to_value(status)?;
        }
        if let Ok(ref dashboard) = dashboard {
            report["dashboard"] = serde_json::to_value(dashboard)?;
        }

        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("CodeMind Workspace Status");
    println!("=========================\n");
    println!("Workspace: {}", workspace_path.display());
    println!("Project:   {}", project_name);

    println!("\nBackend:");
    match status {
        Ok(status) => {
            println!("  Storage:        {}", status.storage_backend);
            println!("  Degraded:       {}", status.degraded);
            if status.degraded {
                for message in &status.degradation_summary {
                    println!("    - {}", message);
                }
            }
            println!("  Indexed files:  {}", status.indexed_file_count);
            println!("  Indexed units:  {}", status.indexed_unit_count);
        }
        Err(e) => println!("  Error: {}", e),
    }

    println!("\nProject dashboard ({}):", project_name);
    match dashboard {
        Ok(dashboard) => {
            println!("  Indexed files:      {}", dashboard.indexed_file_count);
            println!("  Indexed units:      {}", dashboard.indexed_unit_count);
            println!("  Average importance: {:.2}", dashboard.average_importance);
            println!("  Dependency files:   {}", dashboard.dependency_stats.file_count);
            println!("  Dependency edges:   {}", dashboard.dependency_stats.edge_count);
            println!("  Has cycle:          {}", dashboard.dependency_stats.has_cycle);
            if !dashboard.dependency_stats.most_depended_on.is_empty() {
                println!("  Most depended-on:");
                for (path, count) in &dashboard.dependency_stats.most_depended_on {
                    println!("    {} ({} dependents)", path, count);
                }
            }
        }
        Err(e) => println!("  Error: {} (run 'codemind init' or 'codemind update' first)", e),
    }

    Ok(())
}
