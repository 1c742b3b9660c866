//! Pattern matching for code search (FEAT-058): named presets plus
//! arbitrary regexes, scanned against a candidate's content.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    Filter,
    Require,
    Boost,
}

impl std::str::FromStr for PatternMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "filter" => Ok(Self::Filter),
            "require" => Ok(Self::Require),
            "boost" => Ok(Self::Boost),
            other => Err(SearchError::ValidationError(format!("unknown pattern_mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatchLocation {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_matched: bool,
    pub pattern_match_count: usize,
    pub pattern_match_locations: Vec<PatternMatchLocation>,
}

static BARE_EXCEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"except\s*:").unwrap());
static TODO_FIXME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(todo|fixme)\b").unwrap());
static HARDCODED_SECRET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(password|secret|api_key)\s*=\s*['"][^'"]+['"]"#).unwrap());
static SQL_STRING_CONCAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(select|insert|update|delete)\b.*["'+]\s*\+"#).unwrap());

/// Resolves `pattern` to a compiled regex: `@preset:name` looks up a named
/// preset, anything else is compiled as a raw regex.
pub fn resolve_pattern(pattern: &str) -> Result<Regex> {
    if let Some(name) = pattern.strip_prefix("@preset:") {
        return match name {
            "bare_except" => Ok(BARE_EXCEPT.clone()),
            "todo_fixme" => Ok(TODO_FIXME.clone()),
            "hardcoded_secret" => Ok(HARDCODED_SECRET.clone()),
            "sql_string_concat" => Ok(SQL_STRING_CONCAT.clone()),
            other => Err(SearchError::ValidationError(format!("unknown pattern preset: {other}"))),
        };
    }

    Regex::new(pattern).map_err(|e| SearchError::ValidationError(format!("invalid pattern regex: {e}")))
}

/// Scans `content` line by line, recording every match.
pub fn scan(regex: &Regex, content: &str) -> PatternMatch {
    let mut locations = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        for m in regex.find_iter(line) {
            locations.push(PatternMatchLocation {
                line: line_idx + 1,
                column: m.start() + 1,
                text: m.as_str().to_string(),
            });
        }
    }

    PatternMatch {
        pattern_matched: !locations.is_empty(),
        pattern_match_count: locations.len(),
        pattern_match_locations: locations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_bare_except_matches() {
        let regex = resolve_pattern("@preset:bare_except").unwrap();
        let result = scan(&regex, "try:\n    pass\nexcept:\n    pass\n");
        assert!(result.pattern_matched);
        assert_eq!(result.pattern_match_count, 1);
    }

    #[test]
    fn unknown_preset_is_validation_error() {
        let err = resolve_pattern("@preset:nope").unwrap_err();
        assert!(matches!(err, SearchError::ValidationError(_)));
    }

    #[test]
    fn invalid_regex_is_validation_error() {
        let err = resolve_pattern("(unterminated").unwrap_err();
        assert!(matches!(err, SearchError::ValidationError(_)));
    }

    #[test]
    fn mode_parses_filter_require_boost() {
        assert_eq!("filter".parse::<PatternMode>().unwrap(), PatternMode::Filter);
        assert_eq!("require".parse::<PatternMode>().unwrap(), PatternMode::Require);
        assert_eq!("boost".parse::<PatternMode>().unwrap(), PatternMode::Boost);
        assert!("nonsense".parse::<PatternMode>().is_err());
    }

    #[test]
    fn hardcoded_secret_preset_matches_assignment() {
        let regex = resolve_pattern("@preset:hardcoded_secret").unwrap();
        let result = scan(&regex, "api_key = \"sk-12345\"\n");
        assert!(result.pattern_matched);
    }
}
