//! Importance Scorer (C7).
//!
//! Combines C4-C6 with configurable weights. Grounded on
//! `examples/original_source/src/analysis/importance_scorer.py`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use codemind_core::units::Unit;

use super::complexity::ComplexityAnalyzer;
use super::criticality::CriticalityAnalyzer;
use super::usage::UsageAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportanceWeights {
    pub complexity: f32,
    pub usage: f32,
    pub criticality: f32,
}

impl ImportanceWeights {
    pub const BALANCED: Self = Self {
        complexity: 1.0,
        usage: 1.0,
        criticality: 1.0,
    };
    pub const SECURITY: Self = Self {
        complexity: 0.8,
        usage: 0.5,
        criticality: 2.0,
    };
    pub const COMPLEXITY: Self = Self {
        complexity: 2.0,
        usage: 0.5,
        criticality: 0.8,
    };
    pub const API: Self = Self {
        complexity: 1.0,
        usage: 2.0,
        criticality: 1.0,
    };

    pub fn clamp(self) -> Self {
        Self {
            complexity: self.complexity.clamp(0.0, 2.0),
            usage: self.usage.clamp(0.0, 2.0),
            criticality: self.criticality.clamp(0.0, 2.0),
        }
    }
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self::BALANCED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportancePreset {
    Balanced,
    Security,
    Complexity,
    Api,
}

impl ImportancePreset {
    pub fn weights(self) -> ImportanceWeights {
        match self {
            Self::Balanced => ImportanceWeights::BALANCED,
            Self::Security => ImportanceWeights::SECURITY,
            Self::Complexity => ImportanceWeights::COMPLEXITY,
            Self::Api => ImportanceWeights::API,
        }
    }
}

const FALLBACK_SCORE: f32 = 0.5;

pub struct ImportanceScorer;

impl ImportanceScorer {
    pub fn score(
        complexity_score: f32,
        usage_boost: f32,
        criticality_boost: f32,
        weights: ImportanceWeights,
    ) -> f32 {
        let raw = weights.complexity * complexity_score
            + weights.usage * usage_boost
            + weights.criticality * criticality_boost;
        let baseline = weights.complexity * 0.7 + weights.usage * 0.2 + weights.criticality * 0.3;

        if baseline == 0.0 {
            0.0
        } else {
            (raw / baseline).clamp(0.0, 1.0)
        }
    }

    /// Scores every unit in a file, building the per-file call graph once
    /// (C5) and resetting it afterward. A per-unit failure falls back to
    /// `0.5` and is logged, never aborting the batch.
    pub fn calculate_batch(
        units: &[Unit],
        file_path: &str,
        file_content: &str,
        weights: ImportanceWeights,
    ) -> HashMap<String, f32> {
        let mut usage_analyzer = UsageAnalyzer::new();
        let usage_metrics = usage_analyzer.analyze_file(units, file_path, file_content);
        usage_analyzer.reset();

        let mut scores = HashMap::new();
        for unit in units {
            let importance = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let complexity = ComplexityAnalyzer::analyze(unit).complexity_score;
                let usage_boost = usage_metrics
                    .get(&unit.id)
                    .map(|m| m.usage_boost)
                    .unwrap_or(0.0);
                let criticality = CriticalityAnalyzer::analyze(
                    &unit.name,
                    &unit.content,
                    unit.language,
                    file_path,
                )
                .criticality_boost;

                Self::score(complexity, usage_boost, criticality, weights)
            }))
            .unwrap_or_else(|_| {
                warn!(unit = %unit.qualified_name, "importance scoring failed, using fallback");
                FALLBACK_SCORE
            });

            scores.insert(unit.id.clone(), importance);
        }
        scores
    }

    pub fn get_summary_statistics(scores: &[f32], top_n: usize) -> SummaryStatistics {
        if scores.is_empty() {
            return SummaryStatistics {
                count: 0,
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                low: 0,
                medium: 0,
                high: 0,
                top_n: Vec::new(),
            };
        }

        let count = scores.len();
        let sum: f32 = scores.iter().sum();
        let mean = sum / count as f32;
        let min = scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        let low = scores.iter().filter(|&&s| s < 0.3).count();
        let medium = scores.iter().filter(|&&s| (0.3..=0.7).contains(&s)).count();
        let high = scores.iter().filter(|&&s| s > 0.7).count();

        let mut sorted: Vec<f32> = scores.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        sorted.truncate(top_n);

        SummaryStatistics {
            count,
            mean,
            min,
            max,
            low,
            medium,
            high,
            top_n: sorted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub top_n: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemind_core::units::parse;

    #[test]
    fn importance_clamped_to_0_1() {
        let score = ImportanceScorer::score(0.7, 0.2, 0.3, ImportanceWeights::BALANCED);
        assert!((0.0..=1.0).contains(&score));
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_baseline_yields_zero() {
        let weights = ImportanceWeights {
            complexity: 0.0,
            usage: 0.0,
            criticality: 0.0,
        };
        assert_eq!(ImportanceScorer::score(0.7, 0.2, 0.3, weights), 0.0);
    }

    #[test]
    fn security_preset_favors_critical_units() {
        let source = r#"
def name(self):
    return self._name

def authenticate(user, password, token):
    try:
        if verify(password) and check(token):
            for scope in user.scopes:
                grant(scope)
    except Exception:
        raise
"#;
        let result = parse("p", "auth.py", source);
        let scores_balanced =
            ImportanceScorer::calculate_batch(&result.units, "auth.py", source, ImportanceWeights::BALANCED);
        let scores_security =
            ImportanceScorer::calculate_batch(&result.units, "auth.py", source, ImportanceWeights::SECURITY);

        let getter = result.units.iter().find(|u| u.name == "name").unwrap();
        let auth = result.units.iter().find(|u| u.name == "authenticate").unwrap();

        assert!(scores_balanced[&auth.id] > scores_balanced[&getter.id]);
        assert!(scores_security[&auth.id] >= scores_balanced[&auth.id]);
    }

    #[test]
    fn summary_statistics_buckets_correctly() {
        let stats = ImportanceScorer::get_summary_statistics(&[0.1, 0.5, 0.9], 2);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.top_n.len(), 2);
    }
}
