//! CLI command implementations

pub mod init;
pub mod mcp;
pub mod search;
pub mod status;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use codemind_backend::LocalBackend;
use codemind_config::{ConfigLoader, MindConfig};

use crate::GlobalOptions;

/// Resolve the workspace path from options or current directory.
pub fn resolve_workspace(global: &GlobalOptions) -> Result<PathBuf> {
    if let Some(ref ws) = global.workspace {
        let path = PathBuf::from(ws);
        return path
            .canonicalize()
            .with_context(|| format!("Workspace path does not exist: {}", ws));
    }

    std::env::current_dir().context("Failed to get current directory")
}

/// Load configuration with optional config file override.
pub fn load_config(global: &GlobalOptions, workspace: &Path) -> Result<MindConfig> {
    let mut loader = ConfigLoader::new();

    if let Some(ref config_path) = global.config {
        if let Some(parent) = config_path.parent() {
            return loader
                .load_local(parent)
                .context("Failed to load config file")?
                .ok_or_else(|| anyhow::anyhow!("Config file not found: {}", config_path.display()));
        }
    }

    loader
        .load(workspace, None)
        .context("Failed to load configuration")
}

/// Derive the default project name from a workspace path.
pub fn default_project_name(workspace: &Path) -> String {
    workspace
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "workspace".to_string())
}

/// Create a backend for the resolved workspace.
pub async fn create_backend(global: &GlobalOptions) -> Result<LocalBackend> {
    let workspace = resolve_workspace(global)?;
    let mut config = load_config(global, &workspace)?;

    let overrides = global.to_config_overrides();
    config.apply_overrides(&overrides);

    LocalBackend::new(&config, &workspace)
        .await
        .context("Failed to create backend")
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
