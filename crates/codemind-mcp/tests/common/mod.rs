//! Common test utilities for codemind-mcp integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use codemind_mcp::ServerConfig;
use tempfile::TempDir;

/// Build a `ServerConfig` pointed at an unreachable Qdrant port so the
/// backend degrades to the keyword store, and a local (no-network)
/// embedding provider.
pub fn test_server_config(repo_path: impl Into<PathBuf>, repo_id: &str) -> ServerConfig {
    ServerConfig::new(repo_path.into())
        .with_repo_id(repo_id)
        .with_qdrant_url("http://127.0.0.1:1")
}

/// Write a tiny two-file Rust fixture (`lib.rs` importing `util.rs`) under a
/// fresh temp directory and return it.
pub fn write_fixture_project() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write_file(
        dir.path(),
        "lib.rs",
        r#"
mod util;

/// Adds two numbers.
pub fn add(a: i32, b: i32) -> i32 {
    util::helper(a) + b
}
"#,
    );
    write_file(
        dir.path(),
        "util.rs",
        r#"
/// Doubles a number.
pub fn helper(x: i32) -> i32 {
    x * 2
}
"#,
    );
    dir
}

fn write_file(root: &Path, name: &str, content: &str) {
    fs::write(root.join(name), content).expect("failed to write fixture file");
}

/// Parse a tool call's first text content block as JSON.
pub fn parse_tool_response(result: &rmcp::model::CallToolResult) -> serde_json::Value {
    let content = result
        .content
        .first()
        .expect("tool result has no content blocks");
    let text = content
        .as_text()
        .expect("tool result content is not text")
        .text
        .clone();
    serde_json::from_str(&text).expect("failed to parse tool response as JSON")
}

pub fn assert_field_exists(response: &serde_json::Value, field: &str) {
    assert!(
        response.get(field).is_some(),
        "Expected field '{}' in response: {:?}",
        field,
        response
    );
}
