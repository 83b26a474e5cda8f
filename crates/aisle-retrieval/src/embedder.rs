//! Embedding service memoized through the shared cache.

use std::sync::Arc;
use std::time::Duration;

use aisle_core::errors::RetrievalError;
use aisle_core::text::normalize_text;
use aisle_core::traits::EmbeddingService;
use aisle_resilience::Cache;
use async_trait::async_trait;

/// Wraps an embedding provider. Identical texts (after normalization) are
/// embedded once per TTL.
pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingService>,
    cache: Cache,
    ttl: Duration,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingService>, cache: Cache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl EmbeddingService for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Err(RetrievalError::EmbeddingFailed {
                reason: "empty text".to_string(),
            });
        }
        let inner = self.inner.as_ref();
        self.cache
            .with_cache("embed", normalized.as_str(), self.ttl, || inner.embed(&normalized))
            .await
    }
}

impl std::fmt::Debug for CachedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::HashEmbedder;

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let inner = Arc::new(HashEmbedder::default());
        let embedder = CachedEmbedder::new(inner.clone(), Cache::in_memory(10), Duration::from_secs(60));

        let a = embedder.embed("Red Wine").await.unwrap();
        let b = embedder.embed("red  wine").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = Arc::new(HashEmbedder::default());
        inner.set_failing(true);
        let embedder = CachedEmbedder::new(inner.clone(), Cache::in_memory(10), Duration::from_secs(60));

        assert!(embedder.embed("beer").await.is_err());
        inner.set_failing(false);
        assert!(embedder.embed("beer").await.is_ok());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let embedder = CachedEmbedder::new(
            Arc::new(HashEmbedder::default()),
            Cache::in_memory(10),
            Duration::from_secs(60),
        );
        assert!(matches!(
            embedder.embed("   ").await,
            Err(RetrievalError::EmbeddingFailed { .. })
        ));
    }
}
