//! Embedding Cache (C9).
//!
//! Persistent key-value cache over `cache_key = H(text) ∥ model_name`,
//! grounded on `examples/original_source/src/embeddings/cache.py`'s SQLite
//! schema. Errors in the underlying storage degrade to miss behavior and
//! never propagate to callers.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::warn;

const DEFAULT_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_entries: u64,
    pub ttl_days: i64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Counters {
    hits: u64,
    misses: u64,
}

pub struct EmbeddingCache {
    conn: Mutex<Connection>,
    ttl_days: i64,
    counters: Mutex<Counters>,
}

impl EmbeddingCache {
    pub fn open(path: impl AsRef<Path>, ttl_days: i64) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl_days,
            counters: Mutex::new(Counters { hits: 0, misses: 0 }),
        })
    }

    pub fn open_in_memory(ttl_days: i64) -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl_days,
            counters: Mutex::new(Counters { hits: 0, misses: 0 }),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embeddings (
                cache_key TEXT PRIMARY KEY,
                text_hash TEXT NOT NULL,
                model_name TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                accessed_at INTEGER NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_embeddings_text_model
                ON embeddings(text_hash, model_name);",
        )
    }

    fn cache_key(text: &str, model: &str) -> (String, String) {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let text_hash = format!("{:x}", hasher.finalize());
        (format!("{text_hash}:{model}"), text_hash)
    }

    fn encode_vector(vec: &[f32]) -> Vec<u8> {
        vec.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn decode_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// Returns `Some(vec)` iff a live (non-expired) entry exists; a stale hit
    /// is deleted and counted as a miss.
    pub fn get(&self, text: &str, model: &str) -> Option<Vec<f32>> {
        let (key, _) = Self::cache_key(text, model);
        let now = now();
        let ttl_secs = self.ttl_days * 86_400;

        let result = (|| -> rusqlite::Result<Option<Vec<f32>>> {
            let conn = self.conn.lock().unwrap();
            let row: Option<(i64, Vec<u8>)> = conn
                .query_row(
                    "SELECT created_at, embedding FROM embeddings WHERE cache_key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((created_at, embedding)) = row else {
                return Ok(None);
            };

            if now - created_at > ttl_secs {
                conn.execute("DELETE FROM embeddings WHERE cache_key = ?1", params![key])?;
                return Ok(None);
            }

            conn.execute(
                "UPDATE embeddings SET accessed_at = ?1, access_count = access_count + 1 WHERE cache_key = ?2",
                params![now, key],
            )?;

            Ok(Some(Self::decode_vector(&embedding)))
        })();

        match result {
            Ok(Some(vec)) => {
                self.counters.lock().unwrap().hits += 1;
                Some(vec)
            }
            Ok(None) => {
                self.counters.lock().unwrap().misses += 1;
                None
            }
            Err(err) => {
                warn!("embedding cache get failed, degrading to miss: {err}");
                self.counters.lock().unwrap().misses += 1;
                None
            }
        }
    }

    pub fn set(&self, text: &str, model: &str, embedding: &[f32]) {
        let (key, text_hash) = Self::cache_key(text, model);
        let now = now();
        let bytes = Self::encode_vector(embedding);

        let result = self.conn.lock().unwrap().execute(
            "INSERT INTO embeddings (cache_key, text_hash, model_name, embedding, created_at, accessed_at, access_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, 0)
             ON CONFLICT(cache_key) DO UPDATE SET
                embedding = excluded.embedding,
                created_at = excluded.created_at,
                accessed_at = excluded.accessed_at",
            params![key, text_hash, model, bytes, now],
        );

        if let Err(err) = result {
            warn!("embedding cache set failed: {err}");
        }
    }

    /// `get` then, on miss, generate via `f`, store, and return.
    pub fn get_or_generate(
        &self,
        text: &str,
        model: &str,
        f: impl FnOnce(&str) -> Vec<f32>,
    ) -> Vec<f32> {
        if let Some(vec) = self.get(text, model) {
            return vec;
        }
        let vec = f(text);
        self.set(text, model, &vec);
        vec
    }

    pub fn clean_old(&self, days: Option<i64>) -> u64 {
        let ttl_secs = days.unwrap_or(self.ttl_days) * 86_400;
        let cutoff = now() - ttl_secs;

        let result = (|| -> rusqlite::Result<u64> {
            let conn = self.conn.lock().unwrap();
            let n = conn.execute(
                "DELETE FROM embeddings WHERE created_at < ?1",
                params![cutoff],
            )?;
            Ok(n as u64)
        })();

        result.unwrap_or_else(|err| {
            warn!("embedding cache clean_old failed: {err}");
            0
        })
    }

    pub fn clear(&self) -> u64 {
        let result = (|| -> rusqlite::Result<u64> {
            let conn = self.conn.lock().unwrap();
            let n = conn.execute("DELETE FROM embeddings", [])?;
            Ok(n as u64)
        })();

        let n = result.unwrap_or_else(|err| {
            warn!("embedding cache clear failed: {err}");
            0
        });

        let mut counters = self.counters.lock().unwrap();
        counters.hits = 0;
        counters.misses = 0;
        n
    }

    pub fn stats(&self) -> CacheStats {
        let counters = self.counters.lock().unwrap();
        let total_entries: u64 = self
            .conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))
            .unwrap_or(0);

        CacheStats {
            hits: counters.hits,
            misses: counters.misses,
            total_entries,
            ttl_days: self.ttl_days,
        }
    }
}

fn now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::open_in_memory(DEFAULT_TTL_DAYS).expect("in-memory sqlite connection")
    }
}
