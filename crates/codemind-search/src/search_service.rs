//! Code Search Service (C15): semantic/keyword/hybrid/pattern queries over
//! the uniform `MemoryStore`, with quality-metric filters and interpretation.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::{CodeQualityMetrics, QualityAnalyzer};
use crate::embeddings::EmbeddingGenerator;
use crate::error::{Result, SearchError};
use crate::memory::{Memory, MemoryFilter, CATEGORY_CODE, SCOPE_PROJECT};
use crate::pattern::{self, PatternMatch, PatternMode};
use crate::schema::fields;
use crate::store::MemoryStore;

const STORE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Semantic,
    Keyword,
    Hybrid,
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "semantic" => Ok(Self::Semantic),
            "keyword" => Ok(Self::Keyword),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(SearchError::ValidationError(format!("unknown search_mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub project_name: Option<String>,
    pub limit: usize,
    pub file_pattern: Option<String>,
    pub language: Option<String>,
    pub search_mode: SearchMode,
    pub min_complexity: Option<u32>,
    pub max_complexity: Option<u32>,
    pub long_functions: Option<bool>,
    pub maintainability_min: Option<f32>,
    pub include_quality_metrics: bool,
    pub pattern: Option<String>,
    pub pattern_mode: Option<String>,
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Hybrid
    }
}

impl SearchQuery {
    pub fn new() -> Self {
        Self {
            limit: 5,
            include_quality_metrics: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub memory: Memory,
    pub score: f32,
    pub relevance: &'static str,
    pub quality_metrics: Option<CodeQualityMetrics>,
    #[serde(flatten)]
    pub pattern: Option<PatternMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultItem>,
    pub quality: &'static str,
    pub interpretation: String,
    pub degraded_to: Option<&'static str>,
}

pub struct CodeSearchService {
    store: Arc<dyn MemoryStore>,
    embeddings: Arc<EmbeddingGenerator>,
    hybrid_alpha: f32,
}

impl CodeSearchService {
    pub fn new(store: Arc<dyn MemoryStore>, embeddings: Arc<EmbeddingGenerator>) -> Self {
        Self {
            store,
            embeddings,
            hybrid_alpha: 0.6,
        }
    }

    pub fn with_hybrid_alpha(mut self, alpha: f32) -> Self {
        self.hybrid_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    async fn with_timeout<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(STORE_TIMEOUT, fut).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::RetrievalError("timed out".to_string())),
        }
    }

    pub async fn search_code(&self, query: &str, params: SearchQuery) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Ok(SearchResponse {
                query: query.to_string(),
                results: Vec::new(),
                quality: "poor",
                interpretation: "empty query; provide search terms to get results".to_string(),
                degraded_to: None,
            });
        }

        self.run(query, query, params, false).await
    }

    pub async fn find_similar_code(&self, snippet: &str, params: SearchQuery) -> Result<SearchResponse> {
        if snippet.trim().is_empty() {
            return Err(SearchError::ValidationError("snippet must not be empty".to_string()));
        }
        self.run(snippet, snippet, params, true).await
    }

    async fn run(&self, label: &str, query_text: &str, params: SearchQuery, code_to_code: bool) -> Result<SearchResponse> {
        let mut degraded_to = None;

        let filter = MemoryFilter {
            scope: Some(SCOPE_PROJECT.to_string()),
            project_name: params.project_name.clone(),
            category: Some(CATEGORY_CODE.to_string()),
            tags: vec!["code".to_string()],
            ..Default::default()
        };

        let retrieve_limit = if params.search_mode == SearchMode::Hybrid {
            (3 * params.limit).max(50)
        } else {
            params.limit
        };

        let mode = params.search_mode;

        let query_vector = if mode == SearchMode::Keyword {
            None
        } else {
            Some(self.with_timeout(async { self.embeddings.generate(query_text).await }).await?)
        };

        let scored = self
            .with_timeout(async {
                self.store
                    .retrieve(query_vector.clone(), Some(query_text), &filter, retrieve_limit)
                    .await
            })
            .await?;

        let mut candidates: Vec<(Memory, f32)> = scored.into_iter().map(|s| (s.memory, s.score)).collect();

        if mode == SearchMode::Hybrid {
            match lexical_scores(query_text, &candidates) {
                Some(lexical) => {
                    for ((_, score), lex) in candidates.iter_mut().zip(lexical.iter()) {
                        *score = self.hybrid_alpha * *score + (1.0 - self.hybrid_alpha) * lex;
                    }
                }
                None => {
                    degraded_to = Some("semantic");
                }
            }
        }

        // Client-side filters.
        candidates.retain(|(memory, _)| {
            if let Some(pattern) = &params.file_pattern {
                if !memory.metadata_str(fields::FILE_PATH).unwrap_or("").contains(pattern.as_str()) {
                    return false;
                }
            }
            if let Some(language) = &params.language {
                let matches = memory
                    .metadata_str(fields::LANGUAGE)
                    .map(|l| l.eq_ignore_ascii_case(language))
                    .unwrap_or(false);
                if !matches {
                    return false;
                }
            }
            true
        });

        dedup_candidates(&mut candidates);

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(retrieve_limit);

        let pattern_mode = match &params.pattern_mode {
            Some(mode_str) => Some(mode_str.parse::<PatternMode>()?),
            None => None,
        };
        let regex = match &params.pattern {
            Some(p) => Some(pattern::resolve_pattern(p)?),
            None => None,
        };

        let mut results: Vec<(Memory, f32, Option<PatternMatch>)> = candidates
            .into_iter()
            .map(|(memory, score)| {
                let pattern_match = regex.as_ref().map(|r| pattern::scan(r, &memory.content));
                (memory, score, pattern_match)
            })
            .collect();

        if let (Some(mode), Some(_)) = (pattern_mode, &regex) {
            match mode {
                PatternMode::Filter | PatternMode::Require => {
                    results.retain(|(_, _, m)| m.as_ref().map(|m| m.pattern_matched).unwrap_or(false));
                }
                PatternMode::Boost => {
                    results.sort_by(|a, b| {
                        let a_matched = a.2.as_ref().map(|m| m.pattern_matched).unwrap_or(false);
                        let b_matched = b.2.as_ref().map(|m| m.pattern_matched).unwrap_or(false);
                        b_matched.cmp(&a_matched).then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
                    });
                }
            }
        }

        if let Some(min_quality) = params.maintainability_min {
            if params.include_quality_metrics {
                results.retain(|(memory, _, _)| maintainability_of(memory) >= min_quality);
            }
        }
        if let Some(min) = params.min_complexity {
            results.retain(|(memory, _, _)| memory.metadata_u64(fields::CYCLOMATIC_COMPLEXITY).unwrap_or(0) as u32 >= min);
        }
        if let Some(max) = params.max_complexity {
            results.retain(|(memory, _, _)| memory.metadata_u64(fields::CYCLOMATIC_COMPLEXITY).unwrap_or(0) as u32 <= max);
        }
        if let Some(true) = params.long_functions {
            results.retain(|(memory, _, _)| memory.metadata_u64(fields::LINE_COUNT).unwrap_or(0) > 100);
        }

        results.truncate(params.limit.max(1));

        let quality = if results.is_empty() { "poor" } else { "good" };
        let interpretation = interpretation_for(query_text, &results, code_to_code);

        let items = results
            .into_iter()
            .map(|(memory, score, pattern_match)| {
                let quality_metrics = if params.include_quality_metrics {
                    Some(compute_quality(&memory))
                } else {
                    None
                };
                SearchResultItem {
                    relevance: relevance_label(score, code_to_code),
                    memory,
                    score,
                    quality_metrics,
                    pattern: pattern_match,
                }
            })
            .collect();

        Ok(SearchResponse {
            query: label.to_string(),
            results: items,
            quality,
            interpretation,
            degraded_to,
        })
    }
}

fn relevance_label(score: f32, code_to_code: bool) -> &'static str {
    if code_to_code {
        if score >= 0.95 {
            "near-duplicate"
        } else if score >= 0.80 {
            "similar"
        } else {
            "related"
        }
    } else if score > 0.8 {
        "excellent"
    } else if score >= 0.6 {
        "good"
    } else {
        "weak"
    }
}

fn interpretation_for(query: &str, results: &[(Memory, f32, Option<PatternMatch>)], code_to_code: bool) -> String {
    if results.is_empty() {
        return format!("no matches found for \"{query}\"");
    }
    let keywords: Vec<&str> = query.split_whitespace().take(5).collect();
    if code_to_code {
        format!("found {} structurally similar candidates matching {}", results.len(), keywords.join(", "))
    } else {
        format!("found {} matches referencing {}", results.len(), keywords.join(", "))
    }
}

fn maintainability_of(memory: &Memory) -> f32 {
    let cyclomatic = memory.metadata_u64(fields::CYCLOMATIC_COMPLEXITY).unwrap_or(0) as u32;
    let line_count = memory.metadata_u64(fields::LINE_COUNT).unwrap_or(0) as u32;
    QualityAnalyzer::maintainability_index(&crate::analysis::ComplexityMetrics {
        cyclomatic,
        line_count,
        nesting_depth: memory.metadata_u64(fields::NESTING_DEPTH).unwrap_or(0) as u32,
        parameter_count: memory.metadata_u64(fields::PARAMETER_COUNT).unwrap_or(0) as u32,
        has_documentation: memory.metadata_bool(fields::HAS_DOCUMENTATION).unwrap_or(false),
        complexity_score: 0.0,
    })
}

fn compute_quality(memory: &Memory) -> CodeQualityMetrics {
    let analyzer = QualityAnalyzer::default();
    let unit = codemind_core::units::Unit {
        id: memory.id.clone(),
        unit_type: match memory.metadata_str(fields::UNIT_TYPE) {
            Some("class") => codemind_core::units::UnitKind::Class,
            Some("method") => codemind_core::units::UnitKind::Method,
            _ => codemind_core::units::UnitKind::Function,
        },
        name: memory.metadata_str(fields::UNIT_NAME).unwrap_or("").to_string(),
        qualified_name: memory.metadata_str(fields::UNIT_NAME).unwrap_or("").to_string(),
        signature: memory.metadata_str(fields::SIGNATURE).unwrap_or("").to_string(),
        content: memory.content.clone(),
        language: codemind_core::parser::SupportedLanguage::from_path(std::path::Path::new(
            memory.metadata_str(fields::FILE_PATH).unwrap_or("unknown.txt"),
        ))
        .unwrap_or(codemind_core::parser::SupportedLanguage::Python),
        file_path: memory.metadata_str(fields::FILE_PATH).unwrap_or("").to_string(),
        start_line: memory.metadata_u64(fields::START_LINE).unwrap_or(0) as usize,
        end_line: memory.metadata_u64(fields::END_LINE).unwrap_or(0) as usize,
        start_byte: 0,
        end_byte: 0,
    };
    analyzer.analyze(&unit, 0.0)
}

/// Dedups candidates by `(file_path, start_line, unit_name)`, keeping the
/// highest-scoring entry per key.
fn dedup_candidates(candidates: &mut Vec<(Memory, f32)>) {
    let mut best: HashMap<(String, u64, String), usize> = HashMap::new();
    let mut keep = vec![true; candidates.len()];

    for (idx, (memory, score)) in candidates.iter().enumerate() {
        let key = (
            memory.metadata_str(fields::FILE_PATH).unwrap_or("").to_string(),
            memory.metadata_u64(fields::START_LINE).unwrap_or(0),
            memory.metadata_str(fields::UNIT_NAME).unwrap_or("").to_string(),
        );
        match best.get(&key) {
            Some(&prev_idx) if candidates[prev_idx].1 >= *score => {
                keep[idx] = false;
            }
            Some(&prev_idx) => {
                keep[prev_idx] = false;
                best.insert(key, idx);
            }
            None => {
                best.insert(key, idx);
            }
        }
    }

    let mut i = 0;
    candidates.retain(|_| {
        let keep_this = keep[i];
        i += 1;
        keep_this
    });
}

/// In-memory term-overlap lexical scoring over the candidate set, used to
/// complete the hybrid re-rank. Returns `None` (degrade to semantic) when
/// there are no candidates to rank against.
fn lexical_scores(query: &str, candidates: &[(Memory, f32)]) -> Option<Vec<f32>> {
    if candidates.is_empty() {
        return None;
    }
    let terms: Vec<String> = query.split_whitespace().map(|t| t.to_lowercase()).collect();
    if terms.is_empty() {
        return None;
    }

    Some(
        candidates
            .iter()
            .map(|(memory, _)| {
                let content = memory.content.to_lowercase();
                let hits = terms.iter().filter(|t| content.contains(t.as_str())).count();
                hits as f32 / terms.len() as f32
            })
            .collect(),
    )
}
