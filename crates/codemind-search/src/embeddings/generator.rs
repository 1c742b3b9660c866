//! Embedding Generator facade (C10).
//!
//! Wraps an `EmbeddingProvider` (local/Azure ML/OpenAI-compatible) behind a
//! single `generate`/`batch_generate` contract, optionally backed by the
//! embedding cache (C9). Grounded on
//! `examples/original_source/src/embeddings/generator.py`.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SearchError};

use super::cache::EmbeddingCache;
use super::provider::{EmbeddingProvider, ProviderStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyInputError;

impl fmt::Display for EmptyInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "embedding generator received empty input")
    }
}

impl std::error::Error for EmptyInputError {}

/// Generates L2-normalized code embeddings, preserving input order and
/// transparently consulting the embedding cache when configured.
pub struct EmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Option<Arc<EmbeddingCache>>,
    model_name: String,
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            cache: None,
            model_name: model_name.into(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn embedding_dim(&self) -> usize {
        self.provider.embedding_dim()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub async fn check_status(&self) -> Result<ProviderStatus> {
        self.provider.check_status().await
    }

    /// Generate a single embedding for `text`.
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.batch_generate(std::slice::from_ref(&text.to_string())).await?;
        Ok(results.into_iter().next().expect("batch_generate preserves length"))
    }

    /// Generate embeddings for every text in `texts`, preserving order.
    ///
    /// Each returned vector is L2-normalized (`‖v‖₂≈1`). Cache hits are
    /// served directly; misses are generated in a single provider call and
    /// written back.
    pub async fn batch_generate(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() || texts.iter().all(|t| t.trim().is_empty()) {
            return Err(SearchError::EmbeddingError(EmptyInputError.to_string()));
        }

        let Some(cache) = &self.cache else {
            let generated = self.provider.encode_code(texts.to_vec()).await?;
            return Ok(generated.into_iter().map(normalize).collect());
        };

        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut miss_indices = Vec::new();
        let mut miss_texts = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match cache.get(text, &self.model_name) {
                Some(vec) => results[i] = Some(vec),
                None => {
                    miss_indices.push(i);
                    miss_texts.push(text.clone());
                }
            }
        }

        if !miss_indices.is_empty() {
            let generated = self.provider.encode_code(miss_texts.clone()).await?;
            for ((idx, text), vec) in miss_indices.iter().zip(miss_texts.iter()).zip(generated) {
                let normalized = normalize(vec);
                cache.set(text, &self.model_name, &normalized);
                results[*idx] = Some(normalized);
            }
        }

        Ok(results
            .into_iter()
            .map(|v| v.expect("every index is filled by cache hit or miss generation"))
            .collect())
    }
}

fn normalize(vec: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        vec.iter().map(|x| x / norm).collect()
    } else {
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::provider::EmbeddingProviderType;

    struct StubProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for StubProvider {
        async fn encode_semantic(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            self.encode_code(texts).await
        }

        async fn encode_code(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 1.0])
                .collect())
        }

        async fn check_status(&self) -> Result<ProviderStatus> {
            Ok(ProviderStatus::healthy(EmbeddingProviderType::Local, "stub"))
        }

        async fn warmup(&self) -> Result<()> {
            Ok(())
        }

        fn embedding_dim(&self) -> usize {
            3
        }

        fn provider_type(&self) -> EmbeddingProviderType {
            EmbeddingProviderType::Local
        }
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let generator = EmbeddingGenerator::new(Arc::new(StubProvider { calls: AtomicUsize::new(0) }), "stub");
        assert!(generator.generate("").await.is_err());
        assert!(generator.batch_generate(&[]).await.is_err());
    }

    #[tokio::test]
    async fn results_are_l2_normalized() {
        let generator = EmbeddingGenerator::new(Arc::new(StubProvider { calls: AtomicUsize::new(0) }), "stub");
        let vec = generator.generate("hello").await.unwrap();
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-2);
    }

    #[tokio::test]
    async fn order_is_preserved() {
        let generator = EmbeddingGenerator::new(Arc::new(StubProvider { calls: AtomicUsize::new(0) }), "stub");
        let texts = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
        let vecs = generator.batch_generate(&texts).await.unwrap();
        assert_eq!(vecs.len(), 3);
        assert!(vecs[0][0] < vecs[1][0]);
        assert!(vecs[1][0] < vecs[2][0]);
    }

    #[tokio::test]
    async fn cache_avoids_regenerating_hits() {
        let cache = Arc::new(EmbeddingCache::open_in_memory(30).unwrap());
        let provider = Arc::new(StubProvider { calls: AtomicUsize::new(0) });
        let generator = EmbeddingGenerator::new(provider.clone(), "stub").with_cache(cache.clone());

        let texts = vec!["repeat".to_string()];
        generator.batch_generate(&texts).await.unwrap();
        generator.batch_generate(&texts).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
