//! Import extraction (C2: Import Extractor).
//!
//! Line-oriented regex extraction, dispatched per language. Mirrors the
//! matching behavior of a handwritten recursive-descent import parser:
//! fast, tolerant of malformed statements, no AST round-trip required.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    Import,
    FromImport,
    Require,
    DynamicImport,
    Use,
    Mod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub source_file: String,
    pub imported_module: String,
    pub imported_items: Vec<String>,
    pub import_type: ImportType,
    pub line_number: usize,
    pub is_relative: bool,
    pub alias: Option<String>,
    pub raw_statement: String,
}

/// Extract imports from source code. Unknown languages return an empty list
/// rather than an error — this is intentionally infallible at the call site.
pub fn extract_imports(file_path: &str, source: &str, language: &str) -> Vec<Import> {
    match language.to_lowercase().as_str() {
        "python" => extract_python(file_path, source),
        "javascript" | "typescript" => extract_javascript(file_path, source),
        "java" => extract_java(file_path, source),
        "go" => extract_go(file_path, source),
        "rust" => extract_rust(file_path, source),
        _ => Vec::new(),
    }
}

static PY_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s+([a-zA-Z0-9_.]+)(?:\s+as\s+([a-zA-Z0-9_]+))?").unwrap());
static PY_FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*from\s+(\.{0,2}[a-zA-Z0-9_.]*)\s+import\s+(.+)").unwrap());

fn extract_python(file_path: &str, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;
        if line.trim_start().starts_with('#') {
            continue;
        }

        if let Some(caps) = PY_IMPORT.captures(line) {
            let module = caps[1].to_string();
            let alias = caps.get(2).map(|m| m.as_str().to_string());
            let is_relative = module.starts_with('.');
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module,
                imported_items: Vec::new(),
                import_type: ImportType::Import,
                line_number,
                is_relative,
                alias,
                raw_statement: line.trim().to_string(),
            });
            continue;
        }

        if let Some(caps) = PY_FROM_IMPORT.captures(line) {
            let module = caps[1].to_string();
            let items_str = caps[2].trim();
            let items = if items_str == "*" {
                vec!["*".to_string()]
            } else {
                items_str
                    .split(',')
                    .map(|item| {
                        let item = item.trim();
                        item.split(" as ").next().unwrap_or(item).trim().to_string()
                    })
                    .filter(|item| !item.is_empty())
                    .collect()
            };
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module.clone(),
                imported_items: items,
                import_type: ImportType::FromImport,
                line_number,
                is_relative: module.starts_with('.'),
                alias: None,
                raw_statement: line.trim().to_string(),
            });
        }
    }

    imports
}

static JS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*import\s+(?:((?:\{.*?\}|\*\s+as\s+\w+|[a-zA-Z0-9_$]+))\s+)?from\s+["'](.+?)["']"#).unwrap()
});
static JS_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:const|let|var)\s+.*?=\s*require\(["'](.+?)["']\)"#).unwrap());
static JS_DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"import\(["'](.+?)["']\)"#).unwrap());

fn extract_javascript(file_path: &str, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;
        if line.trim_start().starts_with("//") {
            continue;
        }

        if let Some(caps) = JS_IMPORT.captures(line) {
            let items_str = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let module = caps[2].to_string();

            let items = if items_str.is_empty() {
                Vec::new()
            } else if items_str.starts_with('{') && items_str.ends_with('}') {
                items_str[1..items_str.len() - 1]
                    .split(',')
                    .map(|item| {
                        let item = item.trim();
                        item.split(" as ").next().unwrap_or(item).trim().to_string()
                    })
                    .filter(|item| !item.is_empty())
                    .collect()
            } else if items_str.contains('*') {
                vec!["*".to_string()]
            } else {
                vec![items_str.trim().to_string()]
            };

            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module.clone(),
                imported_items: items,
                import_type: ImportType::Import,
                line_number,
                is_relative: module.starts_with('.'),
                alias: None,
                raw_statement: line.trim().to_string(),
            });
            continue;
        }

        if let Some(caps) = JS_REQUIRE.captures(line) {
            let module = caps[1].to_string();
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module.clone(),
                imported_items: Vec::new(),
                import_type: ImportType::Require,
                line_number,
                is_relative: module.starts_with('.'),
                alias: None,
                raw_statement: line.trim().to_string(),
            });
            continue;
        }

        for caps in JS_DYNAMIC_IMPORT.captures_iter(line) {
            let module = caps[1].to_string();
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module.clone(),
                imported_items: Vec::new(),
                import_type: ImportType::DynamicImport,
                line_number,
                is_relative: module.starts_with('.'),
                alias: None,
                raw_statement: caps[0].to_string(),
            });
        }
    }

    imports
}

static JAVA_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s+(?:static\s+)?([a-zA-Z0-9_.]+(?:\.\*)?);\s*$").unwrap());

fn extract_java(file_path: &str, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let Some(caps) = JAVA_IMPORT.captures(line) else {
            continue;
        };
        let full_path = caps[1].to_string();

        let (module, items) = if let Some(stem) = full_path.strip_suffix(".*") {
            (stem.to_string(), vec!["*".to_string()])
        } else {
            let mut parts: Vec<&str> = full_path.split('.').collect();
            if parts.len() > 1 {
                let last = parts.pop().unwrap().to_string();
                (parts.join("."), vec![last])
            } else {
                (String::new(), vec![full_path.clone()])
            }
        };

        imports.push(Import {
            source_file: file_path.to_string(),
            imported_module: module,
            imported_items: items,
            import_type: ImportType::Import,
            line_number,
            is_relative: false,
            alias: None,
            raw_statement: line.trim().to_string(),
        });
    }

    imports
}

static GO_SINGLE_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*import\s+(?:([a-zA-Z0-9_]+)\s+)?"(.+?)"\s*$"#).unwrap());
static GO_IMPORT_BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+\(\s*$").unwrap());
static GO_IMPORT_BLOCK_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\)\s*$").unwrap());
static GO_IMPORT_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:([a-zA-Z0-9_]+)\s+)?"(.+?)"\s*$"#).unwrap());

fn extract_go(file_path: &str, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut in_block = false;

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;

        if GO_IMPORT_BLOCK_START.is_match(line) {
            in_block = true;
            continue;
        }
        if in_block && GO_IMPORT_BLOCK_END.is_match(line) {
            in_block = false;
            continue;
        }

        if in_block {
            if let Some(caps) = GO_IMPORT_ITEM.captures(line) {
                let alias = caps.get(1).map(|m| m.as_str().to_string());
                let module = caps[2].to_string();
                imports.push(Import {
                    source_file: file_path.to_string(),
                    imported_module: module.clone(),
                    imported_items: Vec::new(),
                    import_type: ImportType::Import,
                    line_number,
                    is_relative: module.starts_with('.'),
                    alias,
                    raw_statement: line.trim().to_string(),
                });
            }
            continue;
        }

        if let Some(caps) = GO_SINGLE_IMPORT.captures(line) {
            let alias = caps.get(1).map(|m| m.as_str().to_string());
            let module = caps[2].to_string();
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module.clone(),
                imported_items: Vec::new(),
                import_type: ImportType::Import,
                line_number,
                is_relative: module.starts_with('.'),
                alias,
                raw_statement: line.trim().to_string(),
            });
        }
    }

    imports
}

static RUST_USE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:pub\s+)?use\s+([a-zA-Z0-9_:]+)(?:::\{(.+?)\})?(?:::\*)?;").unwrap());
static RUST_MOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:pub\s+)?mod\s+([a-zA-Z0-9_]+)\s*;").unwrap());

fn extract_rust(file_path: &str, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;

        if let Some(caps) = RUST_USE.captures(line) {
            let module = caps[1].to_string();
            let items_str = caps.get(2).map(|m| m.as_str());

            let items = if let Some(items_str) = items_str {
                items_str
                    .split(',')
                    .map(|item| {
                        let item = item.trim();
                        item.split(" as ").next().unwrap_or(item).trim().to_string()
                    })
                    .filter(|item| !item.is_empty())
                    .collect()
            } else if line.contains("::*") {
                vec!["*".to_string()]
            } else {
                module
                    .split("::")
                    .last()
                    .map(|s| vec![s.to_string()])
                    .unwrap_or_default()
            };

            let is_relative = module.starts_with("crate::") || module.starts_with("super::");
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module,
                imported_items: items,
                import_type: ImportType::Use,
                line_number,
                is_relative,
                alias: None,
                raw_statement: line.trim().to_string(),
            });
            continue;
        }

        if let Some(caps) = RUST_MOD.captures(line) {
            let module = caps[1].to_string();
            imports.push(Import {
                source_file: file_path.to_string(),
                imported_module: module,
                imported_items: Vec::new(),
                import_type: ImportType::Mod,
                line_number,
                is_relative: true,
                alias: None,
                raw_statement: line.trim().to_string(),
            });
        }
    }

    imports
}
