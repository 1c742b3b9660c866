//! Call extraction (C3: Call Extractor).
//!
//! Per-unit scan for identifier-immediately-followed-by-`(` tokens, filtered
//! against each language's control-flow/declaration keywords so `if (`,
//! `for (`, `catch (` etc. don't get recorded as calls. Cross-file
//! resolution is not performed here; `callee_name` is left unqualified.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parser::SupportedLanguage;
use crate::units::Unit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSite {
    pub caller_function: String,
    pub callee_name: String,
    pub line: usize,
    pub column: usize,
    /// Heuristic confidence in [0, 1]; lower when the callee name shadows a
    /// common keyword-adjacent identifier or the match is ambiguous.
    pub confidence: f32,
}

static CALL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

fn keywords_for(language: SupportedLanguage) -> &'static [&'static str] {
    match language {
        SupportedLanguage::Python => &[
            "if", "elif", "while", "for", "except", "with", "return", "yield", "print", "def",
            "class", "lambda", "not", "and", "or", "assert", "raise",
        ],
        SupportedLanguage::JavaScript | SupportedLanguage::TypeScript | SupportedLanguage::Tsx => &[
            "if", "while", "for", "catch", "switch", "return", "function", "typeof", "in", "of",
            "new",
        ],
        SupportedLanguage::Java | SupportedLanguage::CSharp => &[
            "if", "while", "for", "catch", "switch", "return", "new", "foreach", "using", "lock",
        ],
        SupportedLanguage::Go => &["if", "for", "switch", "select", "return", "go", "defer"],
        SupportedLanguage::Rust => &[
            "if", "while", "for", "match", "return", "loop", "let", "fn", "unsafe",
        ],
        SupportedLanguage::C | SupportedLanguage::Cpp => {
            &["if", "while", "for", "switch", "catch", "return", "sizeof", "new", "delete"]
        }
        SupportedLanguage::Ruby => &["if", "while", "until", "unless", "case", "def", "return"],
        SupportedLanguage::Swift => &["if", "while", "for", "switch", "catch", "guard", "return"],
        SupportedLanguage::Kotlin => &["if", "while", "for", "when", "catch", "return", "fun"],
        SupportedLanguage::Php => &["if", "while", "for", "foreach", "switch", "catch", "return"],
        SupportedLanguage::Sql => &[],
    }
}

/// Extract call sites from each unit's own content.
///
/// The caller is identified by the unit's qualified name; function/class
/// units without a body (e.g. abstract methods) simply yield no call sites.
pub fn extract_calls(units: &[Unit]) -> Vec<CallSite> {
    let mut sites = Vec::new();

    for unit in units {
        let language = unit.language;
        let keywords = keywords_for(language);
        let names_in_file: std::collections::HashSet<&str> =
            units.iter().map(|u| u.name.as_str()).collect();

        for (rel_line, line_text) in unit.content.lines().enumerate() {
            for caps in CALL_TOKEN.captures_iter(line_text) {
                let m = caps.get(1).unwrap();
                let name = m.as_str();

                if keywords.contains(&name) {
                    continue;
                }
                if name == unit.name {
                    // Recursive self-call is legitimate per the contract,
                    // but a definition header matching its own name inside
                    // its own first line (e.g. `def foo(` in Python) is not
                    // a call.
                    if rel_line == 0 {
                        continue;
                    }
                }

                let confidence = if names_in_file.contains(name) { 0.9 } else { 0.6 };

                sites.push(CallSite {
                    caller_function: unit.qualified_name.clone(),
                    callee_name: name.to_string(),
                    line: unit.start_line + rel_line + 1,
                    column: m.start(),
                    confidence,
                });
            }
        }
    }

    sites
}
