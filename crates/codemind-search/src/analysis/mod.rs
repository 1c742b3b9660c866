//! Analyzers (C4-C8): pure functions over `codemind_core::Unit` producing the
//! metrics and scores the indexer attaches to stored memories. No I/O.

pub mod complexity;
pub mod criticality;
pub mod importance;
pub mod quality;
pub mod usage;

pub use complexity::{ComplexityMetrics, ComplexityAnalyzer};
pub use criticality::CriticalityAnalyzer;
pub use importance::{ImportancePreset, ImportanceScorer, ImportanceWeights, SummaryStatistics};
pub use quality::{CodeQualityMetrics, QualityAnalyzer, QualityHotspot};
pub use usage::UsageAnalyzer;
