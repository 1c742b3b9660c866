//! CodeMind Core - Source parsing and unit extraction using tree-sitter AST parsing
//!
//! This crate provides the foundational parsing layer for the semantic code
//! memory service:
//! - Tree-sitter AST parsing across the supported language set
//! - Declarative SCM tag queries mapping AST nodes to definitions/references
//! - Containment-based qualified name resolution
//! - Unit, import, call-site, and call-graph extraction
//! - Merkle tree-based change detection for incremental updates

pub mod calls;
pub mod callgraph;
pub mod deps;
pub mod embedded_queries;
pub mod graph;
pub mod imports;
pub mod merkle;
pub mod parser;
pub mod tags;
pub mod units;

// Embedded queries re-exports
pub use embedded_queries::{get_query, has_embedded_query, supported_languages};

// Re-exports for convenience
pub use graph::{
    CallableKind, ContainerKind, DataKind, Edge, EdgeData, EdgeType, Node, NodeKind, NodeMetadata,
    NodeType, PetCodeGraph, GRAPH_SCHEMA_VERSION,
};
pub use merkle::{compute_file_hash, ChangeSet, ExclusionFilter, MerkleTreeManager, TreeStats};
pub use parser::{
    generate_node_id, parse_node_id, CodeParser, ContainmentContext, ContainmentEntry,
    ExtractedTag, MetadataExtractor, ParserError, QueryManager, SupportedLanguage, TagExtractor,
};
pub use tags::{parse_tag_string, TagCategory, TagParseError, TagParseResult};

// Unit extraction re-exports
pub use units::{ParseResult, Unit, UnitError, UnitKind};

// Import extraction re-exports
pub use imports::{extract_imports, Import, ImportType};

// Call extraction re-exports
pub use calls::{extract_calls, CallSite};

// Call-graph re-exports
pub use callgraph::{CallGraph, CallGraphError, FunctionNode};

// Dependency-graph re-exports
pub use deps::{DependencyGraph, DependencyGraphError, DependencyStats};
