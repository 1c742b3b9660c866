//! Quality Analyzer (C8).
//!
//! Grounded on `examples/original_source/src/analysis/quality_analyzer.py`'s
//! maintainability-index approximation and hotspot thresholds.

use serde::{Deserialize, Serialize};

use codemind_core::units::Unit;

use super::complexity::{ComplexityAnalyzer, ComplexityMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotspotCategory {
    Complexity,
    Duplication,
    Length,
    Nesting,
    Documentation,
    Parameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityHotspot {
    pub severity: Severity,
    pub category: HotspotCategory,
    pub file: String,
    pub unit: String,
    pub start: usize,
    pub end: usize,
    pub metric_value: f64,
    pub threshold: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeQualityMetrics {
    pub complexity: ComplexityMetrics,
    pub duplication_score: f32,
    pub maintainability_index: f32,
    pub quality_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct QualityThresholds {
    pub long_function_lines: u32,
    pub deep_nesting: u32,
    pub many_parameters: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            long_function_lines: 100,
            deep_nesting: 4,
            many_parameters: 5,
        }
    }
}

pub struct QualityAnalyzer {
    thresholds: QualityThresholds,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new(QualityThresholds::default())
    }
}

impl QualityAnalyzer {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn maintainability_index(metrics: &ComplexityMetrics) -> f32 {
        let mi = 100.0 - 2.0 * metrics.cyclomatic as f32 - metrics.line_count as f32 / 10.0
            + if metrics.has_documentation { 5.0 } else { 0.0 };
        mi.clamp(0.0, 100.0)
    }

    pub fn analyze(&self, unit: &Unit, duplication_score: f32) -> CodeQualityMetrics {
        let complexity = ComplexityAnalyzer::analyze(unit);
        let maintainability_index = Self::maintainability_index(&complexity);
        let mut quality_flags = Vec::new();

        if complexity.cyclomatic > 20 {
            quality_flags.push("critical_complexity".to_string());
        } else if complexity.cyclomatic > 10 {
            quality_flags.push("high_complexity".to_string());
        }

        if complexity.line_count > self.thresholds.long_function_lines {
            quality_flags.push("long_function".to_string());
        }

        if complexity.nesting_depth > self.thresholds.deep_nesting {
            quality_flags.push("deep_nesting".to_string());
        }

        if complexity.parameter_count > self.thresholds.many_parameters {
            quality_flags.push("many_parameters".to_string());
        }

        if duplication_score >= 0.95 {
            quality_flags.push("exact_duplicate".to_string());
        } else if duplication_score >= 0.85 {
            quality_flags.push("duplicate".to_string());
        }

        if !complexity.has_documentation {
            quality_flags.push("missing_docs".to_string());
        }

        CodeQualityMetrics {
            complexity,
            duplication_score,
            maintainability_index,
            quality_flags,
        }
    }

    pub fn hotspots(&self, unit: &Unit, metrics: &CodeQualityMetrics) -> Vec<QualityHotspot> {
        let mut hotspots = Vec::new();
        let c = &metrics.complexity;

        if c.cyclomatic > 20 {
            hotspots.push(self.hotspot(
                unit,
                Severity::Critical,
                HotspotCategory::Complexity,
                c.cyclomatic as f64,
                20.0,
                "Break this function into smaller pieces to reduce cyclomatic complexity.",
            ));
        } else if c.cyclomatic > 10 {
            hotspots.push(self.hotspot(
                unit,
                Severity::High,
                HotspotCategory::Complexity,
                c.cyclomatic as f64,
                10.0,
                "Consider simplifying the branching logic in this function.",
            ));
        }

        let long_threshold = self.thresholds.long_function_lines;
        if c.line_count > long_threshold * 2 {
            hotspots.push(self.hotspot(
                unit,
                Severity::Critical,
                HotspotCategory::Length,
                c.line_count as f64,
                (long_threshold * 2) as f64,
                "Split this function; it is far beyond the configured length threshold.",
            ));
        } else if c.line_count > long_threshold {
            hotspots.push(self.hotspot(
                unit,
                Severity::High,
                HotspotCategory::Length,
                c.line_count as f64,
                long_threshold as f64,
                "Consider splitting this function into smaller units.",
            ));
        }

        if c.nesting_depth > 6 {
            hotspots.push(self.hotspot(
                unit,
                Severity::Critical,
                HotspotCategory::Nesting,
                c.nesting_depth as f64,
                6.0,
                "Flatten deeply nested control flow with early returns or guard clauses.",
            ));
        } else if c.nesting_depth > 4 {
            hotspots.push(self.hotspot(
                unit,
                Severity::High,
                HotspotCategory::Nesting,
                c.nesting_depth as f64,
                4.0,
                "Reduce nesting depth for readability.",
            ));
        }

        if c.parameter_count > 7 {
            hotspots.push(self.hotspot(
                unit,
                Severity::High,
                HotspotCategory::Parameters,
                c.parameter_count as f64,
                7.0,
                "Group related parameters into a struct.",
            ));
        } else if c.parameter_count > 5 {
            hotspots.push(self.hotspot(
                unit,
                Severity::Medium,
                HotspotCategory::Parameters,
                c.parameter_count as f64,
                5.0,
                "Consider reducing the parameter count.",
            ));
        }

        if metrics.duplication_score >= 0.95 {
            hotspots.push(self.hotspot(
                unit,
                Severity::Critical,
                HotspotCategory::Duplication,
                metrics.duplication_score as f64,
                0.95,
                "This is an exact duplicate of another unit; extract a shared helper.",
            ));
        } else if metrics.duplication_score >= 0.85 {
            hotspots.push(self.hotspot(
                unit,
                Severity::High,
                HotspotCategory::Duplication,
                metrics.duplication_score as f64,
                0.85,
                "This closely duplicates another unit; consider consolidating.",
            ));
        }

        if !c.has_documentation && (c.cyclomatic > 5 || c.line_count > 50) {
            hotspots.push(self.hotspot(
                unit,
                Severity::Medium,
                HotspotCategory::Documentation,
                0.0,
                0.0,
                "Document this function; it is complex enough to warrant an explanation.",
            ));
        }

        hotspots
    }

    fn hotspot(
        &self,
        unit: &Unit,
        severity: Severity,
        category: HotspotCategory,
        metric_value: f64,
        threshold: f64,
        recommendation: &str,
    ) -> QualityHotspot {
        QualityHotspot {
            severity,
            category,
            file: unit.file_path.clone(),
            unit: unit.qualified_name.clone(),
            start: unit.start_line,
            end: unit.end_line,
            metric_value,
            threshold,
            recommendation: recommendation.to_string(),
        }
    }
}
