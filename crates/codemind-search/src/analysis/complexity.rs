//! Complexity Analyzer (C4).
//!
//! Grounded on `examples/original_source/src/analysis/complexity_analyzer.py`:
//! the same per-language decision-token sets, weights, and normalization
//! denominators, expressed as a pure function over `codemind_core::Unit`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use codemind_core::parser::SupportedLanguage;
use codemind_core::units::Unit;

const MAX_CYCLOMATIC: u32 = 20;
const MAX_LINES: u32 = 100;
const MAX_NESTING: u32 = 5;
const MAX_PARAMS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub cyclomatic: u32,
    pub line_count: u32,
    pub nesting_depth: u32,
    pub parameter_count: u32,
    pub has_documentation: bool,
    pub complexity_score: f32,
}

fn decision_tokens(language: SupportedLanguage) -> &'static [&'static str] {
    use SupportedLanguage::*;
    match language {
        Python => &["if", "elif", "for", "while", "and", "or", "except", "case"],
        Ruby => &["if", "elif", "for", "while", "and", "or", "except", "case"],
        Go => &["if", "else if", "for", "select", "case", "&&", "||"],
        Rust => &["if", "else if", "for", "while", "loop", "match", "&&", "||"],
        JavaScript | TypeScript | Tsx | Java | CSharp | Swift | Kotlin | Php | C | Cpp | Sql => {
            &["if", "else if", "for", "while", "do", "case", "catch", "&&", "||", "?:"]
        }
    }
}

static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z_ ]*$").unwrap());

fn count_token(content: &str, token: &str) -> u32 {
    if WORD_TOKEN.is_match(token) {
        let pattern = format!(r"\b{}\b", regex::escape(token));
        Regex::new(&pattern)
            .map(|re| re.find_iter(content).count() as u32)
            .unwrap_or(0)
    } else {
        content.matches(token).count() as u32
    }
}

fn cyclomatic_complexity(content: &str, language: SupportedLanguage) -> u32 {
    let mut score = 1u32;
    for token in decision_tokens(language) {
        score += count_token(content, token);
    }
    score.min(2 * MAX_CYCLOMATIC)
}

fn is_comment_line(line: &str, language: SupportedLanguage) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return true;
    }
    use SupportedLanguage::*;
    match language {
        Python | Ruby => trimmed.starts_with('#'),
        Sql => trimmed.starts_with("--"),
        _ => trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*"),
    }
}

fn line_count(content: &str, language: SupportedLanguage) -> u32 {
    content
        .lines()
        .filter(|l| !is_comment_line(l, language))
        .count() as u32
}

fn nesting_depth(content: &str, language: SupportedLanguage) -> u32 {
    use SupportedLanguage::*;
    let depth = match language {
        Python | Ruby => {
            let indent_unit = 4usize;
            content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| {
                    let spaces = l.len() - l.trim_start_matches(' ').len();
                    let tabs = l.len() - l.trim_start_matches('\t').len();
                    (spaces / indent_unit) + tabs
                })
                .max()
                .unwrap_or(0) as u32
        }
        _ => {
            let mut depth = 0i32;
            let mut max_depth = 0i32;
            for ch in content.chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        max_depth = max_depth.max(depth);
                    }
                    '}' => depth = (depth - 1).max(0),
                    _ => {}
                }
            }
            max_depth.max(0) as u32
        }
    };
    depth.min(2 * MAX_NESTING)
}

fn parameter_count(signature: &str) -> u32 {
    let Some(open) = signature.find('(') else {
        return 0;
    };
    let Some(close) = signature.rfind(')') else {
        return 0;
    };
    if close <= open {
        return 0;
    }
    let inner = &signature[open + 1..close];
    if inner.trim().is_empty() {
        return 0;
    }

    let count = inner
        .split(',')
        .map(|p| {
            p.trim()
                .split(':')
                .next()
                .unwrap_or("")
                .trim()
                .trim_start_matches('&')
                .trim_start_matches("mut ")
                .trim()
                .to_string()
        })
        .filter(|name| !matches!(name.as_str(), "self" | "cls" | "this" | "&self" | "&mut self"))
        .filter(|name| !name.is_empty())
        .count() as u32;

    count.min(2 * MAX_PARAMS)
}

fn has_documentation(content: &str, language: SupportedLanguage) -> bool {
    use SupportedLanguage::*;
    let doc = match language {
        Python => extract_between(content, "\"\"\"", "\"\"\"")
            .or_else(|| extract_between(content, "'''", "'''")),
        Rust => extract_line_comments(content, &["///", "//!"]),
        Go => extract_line_comments(content, &["//"]),
        _ => extract_between(content, "/**", "*/").or_else(|| extract_line_comments(content, &["//"])),
    };
    doc.map(|d| d.trim().len() > 10).unwrap_or(false)
}

fn extract_between(content: &str, open: &str, close: &str) -> Option<String> {
    let start = content.find(open)?;
    let rest = &content[start + open.len()..];
    let end = rest.find(close)?;
    Some(rest[..end].to_string())
}

fn extract_line_comments(content: &str, prefixes: &[&str]) -> Option<String> {
    let mut collected = String::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if prefixes.iter().any(|p| trimmed.starts_with(p)) {
            collected.push_str(trimmed);
        }
    }
    if collected.is_empty() {
        None
    } else {
        Some(collected)
    }
}

fn score(metrics: &ComplexityMetrics) -> f32 {
    let cyclo_n = (metrics.cyclomatic as f32 / MAX_CYCLOMATIC as f32).min(1.5);
    let lines_n = (metrics.line_count as f32 / MAX_LINES as f32).min(1.5);
    let nest_n = (metrics.nesting_depth as f32 / MAX_NESTING as f32).min(1.5);
    let params_n = (metrics.parameter_count as f32 / MAX_PARAMS as f32).min(1.5);

    let weighted = 0.4 * cyclo_n + 0.3 * lines_n + 0.2 * nest_n + 0.1 * params_n;
    let mut value = 0.3 + weighted * 0.4;
    if metrics.has_documentation {
        value += 0.05;
    }
    value.clamp(0.3, 0.7)
}

pub struct ComplexityAnalyzer;

impl ComplexityAnalyzer {
    pub fn analyze(unit: &Unit) -> ComplexityMetrics {
        let language = unit.language;
        let cyclomatic = cyclomatic_complexity(&unit.content, language);
        let lines = line_count(&unit.content, language);
        let nesting = nesting_depth(&unit.content, language);
        let params = parameter_count(&unit.signature);
        let documented = has_documentation(&unit.content, language);

        let mut metrics = ComplexityMetrics {
            cyclomatic,
            line_count: lines,
            nesting_depth: nesting,
            parameter_count: params,
            has_documentation: documented,
            complexity_score: 0.0,
        };
        metrics.complexity_score = score(&metrics);
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemind_core::units::parse;

    #[test]
    fn trivial_getter_is_low_complexity() {
        let result = parse("p", "a.py", "def name(self):\n    return self._name\n");
        let unit = &result.units[0];
        let metrics = ComplexityAnalyzer::analyze(unit);
        assert_eq!(metrics.cyclomatic, 1);
        assert!(metrics.complexity_score < 0.5);
    }

    #[test]
    fn branching_function_scores_higher_than_trivial() {
        let source = r#"
def getter(self):
    return self._name

def branchy(a, b, c, d):
    if a:
        if b:
            for x in c:
                if x and d:
                    pass
    return a
"#;
        let result = parse("p", "a.py", source);
        let getter = result.units.iter().find(|u| u.name == "getter").unwrap();
        let branchy = result.units.iter().find(|u| u.name == "branchy").unwrap();

        let getter_score = ComplexityAnalyzer::analyze(getter).complexity_score;
        let branchy_score = ComplexityAnalyzer::analyze(branchy).complexity_score;
        assert!(branchy_score > getter_score);
    }

    #[test]
    fn parameter_count_excludes_self() {
        assert_eq!(parameter_count("def f(self, a, b):"), 2);
        assert_eq!(parameter_count("fn f(&self, a: i32, b: i32) -> i32"), 2);
        assert_eq!(parameter_count("def f():"), 0);
    }

    #[test]
    fn score_is_always_clamped() {
        let metrics = ComplexityMetrics {
            cyclomatic: 1000,
            line_count: 1000,
            nesting_depth: 1000,
            parameter_count: 1000,
            has_documentation: true,
            complexity_score: 0.0,
        };
        assert!((0.3..=0.7).contains(&score(&metrics)));
    }
}
