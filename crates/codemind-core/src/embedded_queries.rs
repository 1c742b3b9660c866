//! Embedded Tree-sitter queries for code parsing.
//!
//! Query sources are embedded at compile time so the binary works without
//! external query files on disk. Each query follows the tag grammar parsed
//! by [`crate::tags::parse_tag_string`].

use crate::parser::SupportedLanguage;

const C_TAGS: &str = include_str!("../queries/c-tags.scm");
const CPP_TAGS: &str = include_str!("../queries/cpp-tags.scm");
const CSHARP_TAGS: &str = include_str!("../queries/csharp-tags.scm");
const GO_TAGS: &str = include_str!("../queries/go-tags.scm");
const JAVASCRIPT_TAGS: &str = include_str!("../queries/javascript-tags.scm");
const PYTHON_TAGS: &str = include_str!("../queries/python-tags.scm");
const RUST_TAGS: &str = include_str!("../queries/rust-tags.scm");
const TYPESCRIPT_TAGS: &str = include_str!("../queries/typescript-tags.scm");
const JAVA_TAGS: &str = include_str!("../queries/java-tags.scm");
const RUBY_TAGS: &str = include_str!("../queries/ruby-tags.scm");
const SWIFT_TAGS: &str = include_str!("../queries/swift-tags.scm");
const KOTLIN_TAGS: &str = include_str!("../queries/kotlin-tags.scm");
const PHP_TAGS: &str = include_str!("../queries/php-tags.scm");
const SQL_TAGS: &str = include_str!("../queries/sql-tags.scm");

/// Get the embedded tag query source for a language.
pub fn get_query(language: SupportedLanguage) -> Option<&'static str> {
    get_base_query(language)
}

/// Get the base tags query for a language.
pub fn get_base_query(language: SupportedLanguage) -> Option<&'static str> {
    match language {
        SupportedLanguage::C => Some(C_TAGS),
        SupportedLanguage::Cpp => Some(CPP_TAGS),
        SupportedLanguage::CSharp => Some(CSHARP_TAGS),
        SupportedLanguage::Go => Some(GO_TAGS),
        SupportedLanguage::JavaScript => Some(JAVASCRIPT_TAGS),
        SupportedLanguage::Python => Some(PYTHON_TAGS),
        SupportedLanguage::Rust => Some(RUST_TAGS),
        SupportedLanguage::TypeScript => Some(TYPESCRIPT_TAGS),
        SupportedLanguage::Tsx => Some(TYPESCRIPT_TAGS),
        SupportedLanguage::Java => Some(JAVA_TAGS),
        SupportedLanguage::Ruby => Some(RUBY_TAGS),
        SupportedLanguage::Swift => Some(SWIFT_TAGS),
        SupportedLanguage::Kotlin => Some(KOTLIN_TAGS),
        SupportedLanguage::Php => Some(PHP_TAGS),
        SupportedLanguage::Sql => Some(SQL_TAGS),
    }
}

/// Check if an embedded query is available for a language.
pub fn has_embedded_query(language: SupportedLanguage) -> bool {
    get_base_query(language).is_some()
}

/// All languages with embedded tag queries.
pub fn supported_languages() -> &'static [SupportedLanguage] {
    &[
        SupportedLanguage::C,
        SupportedLanguage::Cpp,
        SupportedLanguage::CSharp,
        SupportedLanguage::Go,
        SupportedLanguage::JavaScript,
        SupportedLanguage::Python,
        SupportedLanguage::Rust,
        SupportedLanguage::TypeScript,
        SupportedLanguage::Tsx,
        SupportedLanguage::Java,
        SupportedLanguage::Ruby,
        SupportedLanguage::Swift,
        SupportedLanguage::Kotlin,
        SupportedLanguage::Php,
        SupportedLanguage::Sql,
    ]
}
