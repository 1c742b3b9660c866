//! Semantic unit extraction (C1: Parser Adapter).
//!
//! Walks the tag stream produced by [`crate::parser::TagExtractor`] and turns
//! it into the atomic indexed entities consumed downstream: functions,
//! methods, and classes. Nested classes are flattened to top-level units;
//! their dotted qualified name is computed here from line-range containment,
//! not by the tree-sitter grammar.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::parser::{ContainmentContext, ExtractedTag, ParserError, SupportedLanguage, TagExtractor};
use crate::tags::{parse_tag_string, TagParseError};

/// The kind of a semantic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Function,
    Method,
    Class,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Function => "function",
            UnitKind::Method => "method",
            UnitKind::Class => "class",
        }
    }
}

/// A single semantic unit extracted from a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Deterministic id: hash of (project_name, resolved_file_path, start_line, name).
    pub id: String,
    pub unit_type: UnitKind,
    pub name: String,
    /// Dotted qualified name including enclosing classes (e.g. `Outer.Inner.method`).
    pub qualified_name: String,
    /// Best-effort one-line signature (name plus parameter list when recoverable).
    pub signature: String,
    /// Exact source byte range as text, no added whitespace.
    pub content: String,
    pub language: SupportedLanguage,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Unit {
    /// Compute the deterministic unit id.
    ///
    /// Re-indexing the same unit (same project, resolved path, start line,
    /// name) always produces the same id.
    pub fn compute_id(project_name: &str, resolved_file_path: &str, start_line: usize, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(project_name.as_bytes());
        hasher.update(b"\0");
        hasher.update(resolved_file_path.as_bytes());
        hasher.update(b"\0");
        hasher.update(start_line.to_le_bytes());
        hasher.update(b"\0");
        hasher.update(name.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Result of parsing a single file (C1 contract).
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub units: Vec<Unit>,
    pub language: String,
    pub file_path: String,
    pub parse_time_ms: f64,
}

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("parser error: {0}")]
    Parser(#[from] ParserError),
    #[error("tag parse error: {0}")]
    Tag(#[from] TagParseError),
}

/// Parse a source file into its semantic units.
///
/// Must not fail on syntactically invalid input: a grammar-recovery error
/// (from `ParserError::ParseFailed`) is not raised here — an empty tree
/// still yields whatever units the grammar could recover, possibly none.
/// Unrecognized file extensions return an empty unit set and
/// `language = "unknown"`, per the parser contract.
pub fn parse(project_name: &str, file_path: &str, source_text: &str) -> ParseResult {
    let started = Instant::now();

    let language = SupportedLanguage::from_path(std::path::Path::new(file_path));
    let Some(language) = language else {
        return ParseResult {
            units: Vec::new(),
            language: "unknown".to_string(),
            file_path: file_path.to_string(),
            parse_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
    };

    let units = match extract_units(project_name, file_path, source_text, language) {
        Ok(units) => units,
        Err(_) => Vec::new(),
    };

    ParseResult {
        units,
        language: language.as_str().to_string(),
        file_path: file_path.to_string(),
        parse_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    }
}

fn extract_units(
    project_name: &str,
    file_path: &str,
    source_text: &str,
    language: SupportedLanguage,
) -> Result<Vec<Unit>, UnitError> {
    let mut extractor = TagExtractor::from_embedded(language)?;
    let tags = extractor.extract(source_text)?;

    // Only the `name.*` captures carry both the entity name and (via the
    // parent span) the full definition's line range.
    let mut named: Vec<(ExtractedTag, crate::tags::TagParseResult)> = Vec::new();
    for tag in tags {
        if let Some(stripped) = tag.tag.strip_prefix("name.") {
            let parsed = parse_tag_string(stripped)?;
            named.push((tag, parsed));
        }
    }

    // Process outer-to-inner so containment context sees classes before
    // their methods.
    named.sort_by_key(|(tag, _)| (tag.containment_start_line(), tag.containment_end_line()));

    let mut ctx = ContainmentContext::new();
    let mut units = Vec::new();
    let source_bytes = source_text.as_bytes();

    for (tag, parsed) in &named {
        ctx.update(tag.containment_start_line());

        let start_line = tag.containment_start_line();
        let end_line = tag.containment_end_line();
        let start_byte = tag.start_byte;
        let end_byte = tag.end_byte;

        let is_class = parsed.node_type == crate::graph::NodeType::Container;
        // A callable nested directly inside another callable/container with
        // an active container ancestor is a method; callables at file scope
        // are functions. Constructors count as methods.
        let is_method = !is_class && ctx.depth() > 0;

        let unit_type = if is_class {
            UnitKind::Class
        } else if is_method {
            UnitKind::Method
        } else {
            UnitKind::Function
        };

        let qualified_name = if ctx.is_empty() {
            tag.name.clone()
        } else {
            let mut path = ctx.get_containment_path();
            path.push(&tag.name);
            path.join(".")
        };

        let content = full_node_text(source_text, start_byte, end_byte, tag, source_bytes);
        let signature = content.lines().next().unwrap_or("").trim().to_string();

        let resolved_path = file_path.to_string();
        let id = Unit::compute_id(project_name, &resolved_path, start_line, &tag.name);

        units.push(Unit {
            id,
            unit_type,
            name: tag.name.clone(),
            qualified_name,
            signature,
            content,
            language,
            file_path: resolved_path,
            start_line,
            end_line,
            start_byte,
            end_byte,
        });

        if is_class {
            let node_id = format!("{}:{}", file_path, tag.name);
            ctx.push_container(node_id, "Container".to_string(), start_line, end_line, tag.name.clone());
        }
    }

    Ok(units)
}

fn full_node_text(source: &str, start_byte: usize, end_byte: usize, _tag: &ExtractedTag, _bytes: &[u8]) -> String {
    source
        .get(start_byte..end_byte)
        .unwrap_or_default()
        .to_string()
}
