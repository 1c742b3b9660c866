//! Keyword Store (C12): the degradation-only SQLite backend reached when the
//! configured vector backend is unavailable and fallback is allowed.
//!
//! Relevance is LIKE-based term overlap rather than a vector-backend FTS5
//! index, normalized to `[0, 1]` the same way the vector backend's cosine
//! score is.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, SearchError};
use crate::memory::{Memory, MemoryFilter, MemoryPatch, Page};
use crate::store::{MemoryStore, ScoredMemory};

pub struct KeywordStore {
    conn: Mutex<Connection>,
}

impl KeywordStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS memories (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                context_level TEXT NOT NULL,
                scope TEXT NOT NULL,
                project_name TEXT,
                importance REAL NOT NULL,
                embedding_model TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                tags TEXT NOT NULL,
                metadata TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_memories_project ON memories(project_name);
            CREATE INDEX IF NOT EXISTS idx_memories_category ON memories(category);

            -- Schema-only: no walker populates these yet (§6).
            CREATE TABLE IF NOT EXISTS git_commits (
                sha TEXT PRIMARY KEY,
                project_name TEXT NOT NULL,
                author TEXT NOT NULL,
                message TEXT NOT NULL,
                committed_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS git_file_changes (
                sha TEXT NOT NULL,
                file_path TEXT NOT NULL,
                change_type TEXT NOT NULL,
                PRIMARY KEY (sha, file_path)
            );",
        )?;
        Ok(())
    }

    fn row_to_memory(row: &Row) -> rusqlite::Result<Memory> {
        let tags_json: String = row.get("tags")?;
        let metadata_json: String = row.get("metadata")?;
        let tags: HashSet<String> = serde_json::from_str(&tags_json).unwrap_or_default();
        let metadata = serde_json::from_str(&metadata_json).unwrap_or_default();
        let context_level_str: String = row.get("context_level")?;

        Ok(Memory {
            id: row.get("id")?,
            content: row.get("content")?,
            category: row.get("category")?,
            context_level: crate::schema::context_level_from_str(&context_level_str),
            scope: row.get("scope")?,
            project_name: row.get("project_name")?,
            importance: row.get::<_, f64>("importance")? as f32,
            embedding_model: row.get("embedding_model")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            tags,
            metadata,
        })
    }

    fn upsert_row(conn: &Connection, memory: &Memory) -> Result<()> {
        let tags_json = serde_json::to_string(&memory.tags)?;
        let metadata_json = serde_json::to_string(&memory.metadata)?;
        conn.execute(
            "INSERT INTO memories (id, content, category, context_level, scope, project_name,
                importance, embedding_model, created_at, updated_at, tags, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                content = excluded.content, category = excluded.category,
                context_level = excluded.context_level, scope = excluded.scope,
                project_name = excluded.project_name, importance = excluded.importance,
                embedding_model = excluded.embedding_model, updated_at = excluded.updated_at,
                tags = excluded.tags, metadata = excluded.metadata",
            params![
                memory.id,
                memory.content,
                memory.category,
                crate::schema::context_level_str(memory.context_level),
                memory.scope,
                memory.project_name,
                memory.importance as f64,
                memory.embedding_model,
                memory.created_at,
                memory.updated_at,
                tags_json,
                metadata_json,
            ],
        )?;
        Ok(())
    }

    /// Term-overlap relevance, normalized to `[0, 1]`.
    fn relevance(query: &str, content: &str) -> f32 {
        let terms: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
        if terms.is_empty() {
            return 0.0;
        }
        let content_lower = content.to_lowercase();
        let hits = terms.iter().filter(|t| content_lower.contains(t.as_str())).count();
        hits as f32 / terms.len() as f32
    }

    fn filter_clause(filter: &MemoryFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut clauses = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(scope) = &filter.scope {
            clauses.push("scope = ?".to_string());
            values.push(Box::new(scope.clone()));
        }
        if let Some(project) = &filter.project_name {
            clauses.push("project_name = ?".to_string());
            values.push(Box::new(project.clone()));
        }
        if let Some(category) = &filter.category {
            clauses.push("category = ?".to_string());
            values.push(Box::new(category.clone()));
        }
        if let Some(level) = filter.context_level {
            clauses.push("context_level = ?".to_string());
            values.push(Box::new(crate::schema::context_level_str(level).to_string()));
        }
        if let Some(min) = filter.min_importance {
            clauses.push("importance >= ?".to_string());
            values.push(Box::new(min as f64));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

#[async_trait]
impl MemoryStore for KeywordStore {
    async fn initialize(&self) -> Result<()> {
        Self::init_schema(&self.conn.lock().unwrap())
    }

    async fn store(&self, memory: Memory, _vector: Option<Vec<f32>>) -> Result<()> {
        Self::upsert_row(&self.conn.lock().unwrap(), &memory)
    }

    async fn batch_store(&self, items: Vec<(Memory, Option<Vec<f32>>)>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        for (memory, _vector) in &items {
            Self::upsert_row(&conn, memory)?;
        }
        Ok(())
    }

    async fn retrieve(
        &self,
        _query_vector: Option<Vec<f32>>,
        query_text: Option<&str>,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<ScoredMemory>> {
        let conn = self.conn.lock().unwrap();
        let (clause, values) = Self::filter_clause(filter);
        let sql = format!("SELECT * FROM memories{clause}");

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(params.as_slice(), Self::row_to_memory)?;

        let mut scored: Vec<ScoredMemory> = Vec::new();
        for row in rows {
            let memory = row?;
            if !filter.tags.iter().all(|t| memory.tags.contains(t)) {
                continue;
            }
            let score = match query_text {
                Some(q) if !q.trim().is_empty() => Self::relevance(q, &memory.content),
                _ => 1.0,
            };
            scored.push(ScoredMemory { memory, score });
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.conn.lock().unwrap().execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Memory>> {
        let conn = self.conn.lock().unwrap();
        let memory = conn
            .query_row("SELECT * FROM memories WHERE id = ?1", params![id], Self::row_to_memory)
            .optional()?;
        Ok(memory)
    }

    async fn count(&self, filter: &MemoryFilter) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let (clause, values) = Self::filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM memories{clause}");
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let n: i64 = conn.query_row(&sql, params.as_slice(), |r| r.get(0))?;
        Ok(n as usize)
    }

    async fn update(&self, id: &str, patch: &MemoryPatch) -> Result<()> {
        let mut memory = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| SearchError::MemoryNotFoundError(id.to_string()))?;
        patch.apply(&mut memory);
        Self::upsert_row(&self.conn.lock().unwrap(), &memory)
    }

    async fn scroll(&self, filter: &MemoryFilter, limit: usize, offset: usize) -> Result<Page<Memory>> {
        let total = self.count(filter).await?;
        let conn = self.conn.lock().unwrap();
        let (clause, values) = Self::filter_clause(filter);
        let sql = format!("SELECT * FROM memories{clause} ORDER BY created_at LIMIT ?{} OFFSET ?{}", values.len() + 1, values.len() + 2);

        let mut stmt = conn.prepare(&sql)?;
        let mut all_params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let limit_i64 = limit as i64;
        let offset_i64 = offset as i64;
        all_params.push(&limit_i64);
        all_params.push(&offset_i64);

        let rows = stmt.query_map(all_params.as_slice(), Self::row_to_memory)?;
        let mut items = Vec::new();
        for row in rows {
            let memory = row?;
            if filter.tags.iter().all(|t| memory.tags.contains(t)) {
                items.push(memory);
            }
        }
        Ok(Page::new(items, total, limit, offset))
    }

    async fn delete_code_units_by_project(&self, project_name: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM memories WHERE project_name = ?1 AND category = 'code'",
            params![project_name],
        )?;
        Ok(n)
    }

    async fn get_indexed_files(&self, project_name: &str, limit: usize, offset: usize) -> Result<Page<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT metadata FROM memories WHERE project_name = ?1 AND category = 'code'",
        )?;
        let rows = stmt.query_map(params![project_name], |row| row.get::<_, String>(0))?;

        let mut files: Vec<String> = Vec::new();
        for row in rows {
            let metadata_json = row?;
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&metadata_json) {
                if let Some(path) = value.get("file_path").and_then(|v| v.as_str()) {
                    files.push(path.to_string());
                }
            }
        }
        files.sort();
        files.dedup();

        let total = files.len();
        let items: Vec<String> = files.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, total, limit, offset))
    }

    async fn list_indexed_units(
        &self,
        project_name: &str,
        file_path: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Memory>> {
        let filter = MemoryFilter {
            project_name: Some(project_name.to_string()),
            category: Some(crate::memory::CATEGORY_CODE.to_string()),
            ..Default::default()
        };
        let page = self.scroll(&filter, 10_000, 0).await?;
        let mut items: Vec<Memory> = match file_path {
            Some(path) => page
                .items
                .into_iter()
                .filter(|m| m.metadata_str("file_path") == Some(path))
                .collect(),
            None => page.items,
        };
        let total = items.len();
        items = items.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, total, limit, offset))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.conn.lock().unwrap().execute_batch("SELECT 1").is_ok())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, content: &str, project: &str) -> Memory {
        let mut m = Memory::new(id, content);
        m.project_name = Some(project.to_string());
        m.tags.insert(crate::memory::CATEGORY_CODE.to_string());
        m
    }

    #[tokio::test]
    async fn store_then_get_by_id_roundtrips() {
        let store = KeywordStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        let memory = sample("a", "fn authenticate(user: &str) {}", "proj");
        store.store(memory.clone(), None).await.unwrap();

        let fetched = store.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(fetched.content, memory.content);
    }

    #[tokio::test]
    async fn retrieve_ranks_by_term_overlap() {
        let store = KeywordStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        store.store(sample("a", "def authenticate_user(password): pass", "proj"), None).await.unwrap();
        store.store(sample("b", "def helper(): pass", "proj"), None).await.unwrap();

        let filter = MemoryFilter::default();
        let hits = store.retrieve(None, Some("authenticate password"), &filter, 10).await.unwrap();
        assert_eq!(hits[0].memory.id, "a");
    }

    #[tokio::test]
    async fn delete_code_units_by_project_scopes_to_category() {
        let store = KeywordStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        store.store(sample("a", "code", "proj"), None).await.unwrap();
        let mut note = Memory::new("b", "a note");
        note.project_name = Some("proj".to_string());
        note.category = "note".to_string();
        store.store(note, None).await.unwrap();

        let deleted = store.delete_code_units_by_project("proj").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get_by_id("b").await.unwrap().is_some());
    }
}
