//! Usage Analyzer (C5).
//!
//! Grounded on `examples/original_source/src/analysis/usage_analyzer.py`'s
//! per-file call graph and caller-count boost. Stateful: callers must call
//! `reset()` between files.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use codemind_core::parser::SupportedLanguage;
use codemind_core::units::Unit;

const ENTRY_POINT_FILENAMES: &[&str] = &["main", "index", "app", "server", "api", "cli", "__init__"];
const ENTRY_POINT_PATH_COMPONENTS: &[&str] = &["api", "core", "routes", "endpoints", "handlers"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub caller_count: usize,
    pub is_public: bool,
    pub is_exported: bool,
    pub is_entry_point: bool,
    pub usage_boost: f32,
}

static IDENT_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

#[derive(Default)]
pub struct UsageAnalyzer {
    calls_out: HashMap<String, HashSet<String>>,
}

impl UsageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.calls_out.clear();
    }

    pub fn analyze_file(
        &mut self,
        units: &[Unit],
        file_path: &str,
        file_content: &str,
    ) -> HashMap<String, UsageMetrics> {
        self.reset();

        let names: HashSet<&str> = units.iter().map(|u| u.name.as_str()).collect();
        for unit in units {
            let mut callees = HashSet::new();
            for caps in IDENT_CALL.captures_iter(&unit.content) {
                let name = caps.get(1).unwrap().as_str();
                if name != unit.name && names.contains(name) {
                    callees.insert(name.to_string());
                }
            }
            self.calls_out.insert(unit.name.clone(), callees);
        }

        let mut result = HashMap::new();
        for unit in units {
            let caller_count = self
                .calls_out
                .iter()
                .filter(|(caller, callees)| {
                    caller.as_str() != unit.name && callees.contains(&unit.name)
                })
                .count();

            let language = unit.language;
            let is_public = Self::is_public(&unit.name, language);
            let is_exported = Self::is_exported(&unit.name, language, file_content);
            let is_entry_point = Self::is_entry_point(file_path);

            let usage_boost = Self::usage_boost(caller_count, is_public, is_exported, is_entry_point);

            result.insert(
                unit.id.clone(),
                UsageMetrics {
                    caller_count,
                    is_public,
                    is_exported,
                    is_entry_point,
                    usage_boost,
                },
            );
        }

        result
    }

    fn is_public(name: &str, language: SupportedLanguage) -> bool {
        use SupportedLanguage::*;
        match language {
            Python | JavaScript | TypeScript | Tsx | Ruby | Php => {
                !name.starts_with('_') && !name.starts_with('#')
            }
            Go => name.chars().next().is_some_and(|c| c.is_uppercase()),
            _ => true,
        }
    }

    fn is_exported(name: &str, language: SupportedLanguage, file_content: &str) -> bool {
        use SupportedLanguage::*;
        match language {
            Python => {
                if let Some(all_decl) = file_content.find("__all__") {
                    file_content[all_decl..].contains(&format!("\"{name}\""))
                        || file_content[all_decl..].contains(&format!("'{name}'"))
                } else {
                    false
                }
            }
            JavaScript | TypeScript | Tsx => {
                file_content.contains(&format!("export function {name}"))
                    || file_content.contains(&format!("export const {name}"))
                    || file_content.contains(&format!("export class {name}"))
                    || file_content.contains(&format!("export default {name}"))
                    || file_content.contains(&format!("exports.{name}"))
            }
            Go => name.chars().next().is_some_and(|c| c.is_uppercase()),
            Java | CSharp | Kotlin => file_content
                .lines()
                .any(|l| l.contains(name) && l.contains("public")),
            _ => false,
        }
    }

    fn is_entry_point(file_path: &str) -> bool {
        let path = std::path::Path::new(file_path);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ENTRY_POINT_FILENAMES.contains(&stem.as_str()) {
            return true;
        }
        let path_lower = file_path.to_lowercase();
        ENTRY_POINT_PATH_COMPONENTS
            .iter()
            .any(|c| path_lower.split(['/', '\\']).any(|part| part == *c))
    }

    fn caller_component(caller_count: usize) -> f32 {
        match caller_count {
            0 => 0.0,
            1..=2 => (caller_count as f32 / 2.0) * 0.03,
            3..=9 => 0.03 + ((caller_count - 2) as f32 / 7.0) * 0.07,
            _ => 0.10,
        }
    }

    fn usage_boost(caller_count: usize, is_public: bool, is_exported: bool, is_entry_point: bool) -> f32 {
        let mut boost = Self::caller_component(caller_count);
        if is_public {
            boost += 0.03;
        }
        if is_exported {
            boost += 0.03;
        }
        if is_entry_point {
            boost += 0.04;
        }
        boost.clamp(0.0, 0.2)
    }
}
