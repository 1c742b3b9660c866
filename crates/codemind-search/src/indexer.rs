//! Incremental Indexer (C14): orchestrates C1-C12 per file/directory and
//! reconciles stale entries on rename/delete.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use codemind_core::units::parse;
use codemind_core::{extract_calls, extract_imports, CallGraph, FunctionNode};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, warn};
use walkdir::WalkDir;

use crate::analysis::{ImportanceScorer, ImportanceWeights};
use crate::embeddings::EmbeddingGenerator;
use crate::error::Result;
use crate::memory::{Memory, MemoryFilter, CATEGORY_CODE, SCOPE_PROJECT};
use crate::schema::fields;
use crate::store::MemoryStore;

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "go", "rs", "rb", "swift", "kt", "kts", "php", "json",
    "yaml", "yml", "toml", "c", "h", "cpp", "cc", "cxx", "hpp", "hxx", "hh", "cs", "sql",
];

const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".venv",
    "venv",
    ".virtualenv",
    "__pycache__",
    "node_modules",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    ".worktrees",
];

fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// True if any path component (relative to the walk root) is hidden or in
/// the excluded-directory set. The root itself is never checked against
/// this, so an indexed root named e.g. `.worktrees` is not filtered out.
fn is_excluded_relative(rel: &Path) -> bool {
    rel.components().any(|c| {
        let std::path::Component::Normal(name) = c else {
            return false;
        };
        let name = name.to_string_lossy();
        (name.starts_with('.') && name != ".") || EXCLUDED_DIRS.contains(&name.as_ref())
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileIndexResult {
    pub skipped: bool,
    pub units_indexed: usize,
    pub parse_time_ms: f64,
    pub language: String,
    pub unit_ids: Vec<String>,
    pub imports_extracted: usize,
    pub dependencies: Vec<String>,
    pub call_sites_extracted: usize,
    pub implementations_extracted: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub total_files: usize,
    pub indexed_files: usize,
    pub total_units: usize,
    pub skipped_files: usize,
    pub failed_files: Vec<FailedFile>,
    pub cleaned_entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub file_path: String,
    pub error: String,
}

/// `(done, total, current_file_name?, error_info?)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize, Option<&str>, Option<&str>) + Send + Sync>;

#[derive(Clone)]
pub struct IncrementalIndexer {
    store: Arc<dyn MemoryStore>,
    embeddings: Arc<EmbeddingGenerator>,
    project_name: String,
    max_concurrent: usize,
    importance_weights: ImportanceWeights,
}

impl IncrementalIndexer {
    pub fn new(store: Arc<dyn MemoryStore>, embeddings: Arc<EmbeddingGenerator>, project_name: impl Into<String>) -> Self {
        Self {
            store,
            embeddings,
            project_name: project_name.into(),
            max_concurrent: 4,
            importance_weights: ImportanceWeights::BALANCED,
        }
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn with_importance_weights(mut self, weights: ImportanceWeights) -> Self {
        self.importance_weights = weights;
        self
    }

    /// Steps 1-11 of the per-file indexing algorithm.
    pub async fn index_file(&self, path: &Path) -> Result<FileIndexResult> {
        if !is_supported_extension(path) {
            return Ok(FileIndexResult {
                skipped: true,
                ..Default::default()
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let source = String::from_utf8_lossy(&bytes).into_owned();

        let file_path = path.to_string_lossy().into_owned();
        let parse_result = parse(&self.project_name, &file_path, &source);
        let units = parse_result.units;

        let imports = extract_imports(&file_path, &source, &parse_result.language);
        let dependencies: Vec<String> = {
            let mut deps: Vec<String> = imports.iter().map(|i| i.imported_module.clone()).collect();
            deps.sort();
            deps.dedup();
            deps
        };

        let call_sites = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| extract_calls(&units)))
            .unwrap_or_else(|_| {
                warn!(file = %file_path, "call extraction failed, continuing without call sites");
                Vec::new()
            });

        if units.is_empty() {
            self.delete_file_index(path).await?;
            return Ok(FileIndexResult {
                skipped: false,
                units_indexed: 0,
                parse_time_ms: parse_result.parse_time_ms,
                language: parse_result.language,
                unit_ids: Vec::new(),
                imports_extracted: imports.len(),
                dependencies,
                call_sites_extracted: 0,
                implementations_extracted: 0,
            });
        }

        let indexable_contents: Vec<String> = units
            .iter()
            .map(|u| {
                format!(
                    "File: {}:{}-{}\n{}: {}\nSignature: {}\n\nContent:\n{}",
                    u.file_path,
                    u.start_line,
                    u.end_line,
                    u.unit_type.as_str(),
                    u.name,
                    u.signature,
                    u.content
                )
            })
            .collect();

        let embeddings = self.embeddings.batch_generate(&indexable_contents).await?;

        self.delete_file_index(path).await?;

        let importance = ImportanceScorer::calculate_batch(&units, &file_path, &source, self.importance_weights);

        let file_meta = tokio::fs::metadata(path).await.ok();
        let file_modified_at = file_meta
            .as_ref()
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let file_size_bytes = file_meta.map(|m| m.len()).unwrap_or(0);
        let indexed_at = crate::memory::now_unix();

        let mut batch = Vec::with_capacity(units.len());
        let mut unit_ids = Vec::with_capacity(units.len());

        for (unit, vector) in units.iter().zip(embeddings.into_iter()) {
            let score = importance.get(&unit.id).copied().unwrap_or(0.5);
            let complexity = crate::analysis::ComplexityAnalyzer::analyze(unit);

            let mut memory = Memory::new(unit.id.clone(), unit.content.clone());
            memory.category = CATEGORY_CODE.to_string();
            memory.scope = SCOPE_PROJECT.to_string();
            memory.project_name = Some(self.project_name.clone());
            memory.importance = score;
            memory.embedding_model = self.embeddings.model_name().to_string();
            memory.tags.insert("code".to_string());

            memory.metadata.insert(fields::FILE_PATH.into(), unit.file_path.clone().into());
            memory.metadata.insert(fields::LANGUAGE.into(), parse_result.language.clone().into());
            memory.metadata.insert(fields::UNIT_TYPE.into(), unit.unit_type.as_str().into());
            memory.metadata.insert(fields::UNIT_NAME.into(), unit.name.clone().into());
            memory.metadata.insert(fields::START_LINE.into(), unit.start_line.into());
            memory.metadata.insert(fields::END_LINE.into(), unit.end_line.into());
            memory.metadata.insert(fields::SIGNATURE.into(), unit.signature.clone().into());
            memory.metadata.insert(fields::CYCLOMATIC_COMPLEXITY.into(), complexity.cyclomatic.into());
            memory.metadata.insert(fields::LINE_COUNT.into(), complexity.line_count.into());
            memory.metadata.insert(fields::NESTING_DEPTH.into(), complexity.nesting_depth.into());
            memory.metadata.insert(fields::PARAMETER_COUNT.into(), complexity.parameter_count.into());
            memory.metadata.insert(fields::HAS_DOCUMENTATION.into(), complexity.has_documentation.into());
            memory.metadata.insert(
                fields::IMPORTS.into(),
                serde_json::json!(imports.iter().map(|i| i.imported_module.clone()).collect::<Vec<_>>()),
            );
            memory.metadata.insert(fields::DEPENDENCIES.into(), serde_json::json!(dependencies));
            memory.metadata.insert(fields::IMPORT_COUNT.into(), imports.len().into());
            memory.metadata.insert(fields::FILE_MODIFIED_AT.into(), file_modified_at.into());
            memory.metadata.insert(fields::FILE_SIZE_BYTES.into(), file_size_bytes.into());
            memory.metadata.insert(fields::INDEXED_AT.into(), indexed_at.into());

            unit_ids.push(memory.id.clone());
            batch.push((memory, Some(vector)));
        }

        self.store.batch_store(batch).await?;

        let mut graph = CallGraph::new();
        for unit in &units {
            if matches!(
                unit.unit_type,
                codemind_core::units::UnitKind::Function | codemind_core::units::UnitKind::Method
            ) {
                graph.upsert_function(FunctionNode {
                    name: unit.name.clone(),
                    qualified_name: unit.qualified_name.clone(),
                    file_path: unit.file_path.clone(),
                    language: unit.language,
                    start_line: unit.start_line,
                    end_line: unit.end_line,
                    is_exported: true,
                    is_async: false,
                    parameters: Vec::new(),
                    return_type: None,
                });
            }
        }
        for site in &call_sites {
            graph.record_call(&site.caller_function, &site.callee_name, site.confidence);
        }

        Ok(FileIndexResult {
            skipped: false,
            units_indexed: units.len(),
            parse_time_ms: parse_result.parse_time_ms,
            language: parse_result.language,
            unit_ids,
            imports_extracted: imports.len(),
            dependencies,
            call_sites_extracted: call_sites.len(),
            implementations_extracted: 0,
        })
    }

    /// Removes all units whose `file_path` matches, returning the count.
    pub async fn delete_file_index(&self, path: &Path) -> Result<usize> {
        let file_path = path.to_string_lossy().into_owned();
        let filter = MemoryFilter {
            project_name: Some(self.project_name.clone()),
            category: Some(CATEGORY_CODE.to_string()),
            ..Default::default()
        };
        let page = self.store.scroll(&filter, 100_000, 0).await?;
        let mut n = 0;
        for memory in page.items {
            if memory.metadata_str(fields::FILE_PATH) == Some(file_path.as_str()) {
                self.store.delete(&memory.id).await?;
                n += 1;
            }
        }
        Ok(n)
    }

    pub async fn index_directory(
        &self,
        root: &Path,
        recursive: bool,
        max_concurrent: Option<usize>,
        progress: Option<ProgressCallback>,
    ) -> Result<IndexStats> {
        let max_concurrent = max_concurrent.unwrap_or(self.max_concurrent).max(1);

        let mut files = Vec::new();
        let walker = if recursive {
            WalkDir::new(root)
        } else {
            WalkDir::new(root).max_depth(1)
        };
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if is_excluded_relative(rel) {
                continue;
            }
            if !is_supported_extension(entry.path()) {
                continue;
            }
            files.push(entry.path().to_path_buf());
        }

        let total = files.len();
        if let Some(cb) = &progress {
            cb(0, total, None, None);
        }

        // Semaphore bounds how many files are in flight at once; each permit
        // is held for the duration of one index_file call, released on
        // completion, letting the next queued file start concurrently.
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut join_set = tokio::task::JoinSet::new();
        for path in files {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let indexer = self.clone();
            join_set.spawn(async move {
                let file_name = path.to_string_lossy().into_owned();
                let result = indexer.index_file(&path).await;
                drop(permit);
                (file_name, result)
            });
        }

        let mut results: Vec<(String, Result<FileIndexResult>)> = Vec::with_capacity(total);
        let mut done = 0usize;
        while let Some(joined) = join_set.join_next().await {
            let (file_name, result) = joined.expect("index_file task panicked");
            done += 1;

            match &result {
                Ok(_) => {
                    if let Some(cb) = &progress {
                        cb(done, total, Some(&file_name), None);
                    }
                }
                Err(e) => {
                    error!(file = %file_name, error = %e, "indexing failed");
                    if let Some(cb) = &progress {
                        cb(done, total, Some(&file_name), Some(&e.to_string()));
                    }
                }
            }
            results.push((file_name, result));
        }

        let mut stats = IndexStats {
            total_files: total,
            ..Default::default()
        };
        let mut seen_paths: HashSet<String> = HashSet::new();

        for (file_name, result) in results {
            seen_paths.insert(file_name.clone());
            match result {
                Ok(r) if r.skipped => stats.skipped_files += 1,
                Ok(r) => {
                    stats.indexed_files += 1;
                    stats.total_units += r.units_indexed;
                }
                Err(e) => stats.failed_files.push(FailedFile {
                    file_path: file_name,
                    error: e.to_string(),
                }),
            }
        }

        stats.cleaned_entries = self.reconcile_stale(root, &seen_paths).await?;

        Ok(stats)
    }

    /// Deletes every previously-indexed unit under `root` whose `file_path`
    /// is absent from the current enumeration (renamed/removed files).
    async fn reconcile_stale(&self, root: &Path, seen: &HashSet<String>) -> Result<usize> {
        let filter = MemoryFilter {
            project_name: Some(self.project_name.clone()),
            category: Some(CATEGORY_CODE.to_string()),
            ..Default::default()
        };
        let page = self.store.scroll(&filter, 200_000, 0).await?;

        let root_prefix = root.to_string_lossy().into_owned();
        let mut stale_paths: HashMap<String, ()> = HashMap::new();
        for memory in &page.items {
            if let Some(path) = memory.metadata_str(fields::FILE_PATH) {
                if path.starts_with(&root_prefix) && !seen.contains(path) {
                    stale_paths.insert(path.to_string(), ());
                }
            }
        }

        let mut cleaned = 0;
        for path in stale_paths.keys() {
            cleaned += self.delete_file_index(Path::new(path)).await?;
        }
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions_cover_primary_languages() {
        assert!(is_supported_extension(Path::new("a.py")));
        assert!(is_supported_extension(Path::new("a.rs")));
        assert!(is_supported_extension(Path::new("a.sql")));
        assert!(!is_supported_extension(Path::new("a.exe")));
    }

    #[test]
    fn excludes_hidden_and_named_directories() {
        assert!(is_excluded_relative(Path::new("node_modules/pkg/index.js")));
        assert!(is_excluded_relative(Path::new(".git/HEAD")));
        assert!(!is_excluded_relative(Path::new("src/main.rs")));
    }

    #[test]
    fn root_named_like_excluded_dir_is_not_filtered() {
        // Exclusion is relative-to-root; the root component itself is
        // stripped before the check runs.
        let rel = Path::new("main.rs");
        assert!(!is_excluded_relative(rel));
    }
}
