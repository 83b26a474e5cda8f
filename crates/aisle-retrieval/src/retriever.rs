//! Fail-soft access to the product repository.

use std::collections::HashSet;
use std::sync::Arc;

use aisle_core::config::PipelineConfig;
use aisle_core::errors::RetrievalError;
use aisle_core::models::{HardFilters, Product, ProductId, SoftFilters};
use aisle_core::text::tokenize;
use aisle_core::traits::{EmbeddingService, ProductRepository};
use aisle_observability::{retrieval_span, DegradationTracker};
use tracing::{debug, Instrument};

/// Ranked lists from one concurrent text + vector step. A list is empty when
/// its source failed; the failure is recorded on the tracker.
#[derive(Debug, Clone, Default)]
pub struct HybridResults {
    pub text: Vec<Product>,
    pub vector: Vec<Product>,
    /// The query embedding, when embedding succeeded.
    pub embedding: Option<Vec<f32>>,
}

impl HybridResults {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.vector.is_empty()
    }
}

/// Issues repository queries on behalf of the pipeline. Queries that belong
/// to one fusion step run concurrently; a failing source degrades to the
/// others and only the failure of every source is an error.
pub struct CandidateRetriever {
    repository: Arc<dyn ProductRepository>,
    embedder: Arc<dyn EmbeddingService>,
    max_fuzzy_tokens: usize,
    vector_pool_cap: usize,
}

impl CandidateRetriever {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        embedder: Arc<dyn EmbeddingService>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            repository,
            embedder,
            max_fuzzy_tokens: config.max_fuzzy_tokens,
            vector_pool_cap: config.vector_pool_cap,
        }
    }

    pub fn repository(&self) -> &dyn ProductRepository {
        self.repository.as_ref()
    }

    /// The query as sent to full-text search: at most `max_fuzzy_tokens`
    /// tokens.
    pub fn text_query(&self, query: &str) -> String {
        tokenize(query)
            .into_iter()
            .take(self.max_fuzzy_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.embedder.embed(text).await
    }

    pub async fn text_search(
        &self,
        query: &str,
        hard: &HardFilters,
        soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError> {
        let text = self.text_query(query);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.repository
            .text_search(&text, hard, soft, limit, exclude)
            .instrument(retrieval_span!("text", limit))
            .await
    }

    /// Vector search with the pool capped at `vector_pool_cap`.
    pub async fn vector_search(
        &self,
        embedding: &[f32],
        hard: &HardFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
        soft: Option<&SoftFilters>,
        enforce_soft: bool,
    ) -> Result<Vec<Product>, RetrievalError> {
        let limit = limit.min(self.vector_pool_cap);
        self.repository
            .vector_search(embedding, hard, limit, exclude, soft, enforce_soft)
            .instrument(retrieval_span!("vector", limit))
            .await
    }

    async fn embed_and_search(
        &self,
        query: &str,
        hard: &HardFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<(Vec<f32>, Vec<Product>), RetrievalError> {
        let embedding = self.embed(query).await?;
        let products = self
            .vector_search(&embedding, hard, limit, exclude, None, false)
            .await?;
        Ok((embedding, products))
    }

    /// Concurrent text and vector search for one fusion step.
    pub async fn hybrid(
        &self,
        query: &str,
        hard: &HardFilters,
        soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
        tracker: &mut DegradationTracker,
    ) -> Result<HybridResults, RetrievalError> {
        let (text, vector) = tokio::join!(
            self.text_search(query, hard, soft, limit, exclude),
            self.embed_and_search(query, hard, limit, exclude),
        );

        match (text, vector) {
            (Ok(text), Ok((embedding, vector))) => Ok(HybridResults {
                text,
                vector,
                embedding: Some(embedding),
            }),
            (Ok(text), Err(e)) => {
                tracker.note("vector_search", "text_only", e.to_string());
                Ok(HybridResults {
                    text,
                    ..Default::default()
                })
            }
            (Err(e), Ok((embedding, vector))) => {
                tracker.note("text_search", "vector_only", e.to_string());
                Ok(HybridResults {
                    text: Vec::new(),
                    vector,
                    embedding: Some(embedding),
                })
            }
            (Err(t), Err(v)) => Err(RetrievalError::AllSourcesFailed {
                reasons: vec![t.to_string(), v.to_string()],
            }),
        }
    }

    /// Semantic expansion for a category-bounded step: one call enforcing
    /// the query's soft categories and one open call, run concurrently.
    /// Enforced hits rank first; duplicates keep their best rank.
    pub async fn vector_expansion(
        &self,
        embedding: &[f32],
        hard: &HardFilters,
        soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
        tracker: &mut DegradationTracker,
    ) -> Result<Vec<Product>, RetrievalError> {
        if soft.soft_category.is_empty() {
            return self
                .vector_search(embedding, hard, limit, exclude, Some(soft), false)
                .await;
        }

        let (enforced, open) = tokio::join!(
            self.vector_search(embedding, hard, limit, exclude, Some(soft), true),
            self.vector_search(embedding, hard, limit, exclude, Some(soft), false),
        );

        let (enforced, open) = match (enforced, open) {
            (Ok(e), Ok(o)) => (e, o),
            (Ok(e), Err(err)) => {
                tracker.note("vector_search_open", "enforced_only", err.to_string());
                (e, Vec::new())
            }
            (Err(err), Ok(o)) => {
                tracker.note("vector_search_enforced", "open_only", err.to_string());
                (Vec::new(), o)
            }
            (Err(a), Err(b)) => {
                return Err(RetrievalError::AllSourcesFailed {
                    reasons: vec![a.to_string(), b.to_string()],
                })
            }
        };

        let mut seen = HashSet::new();
        let merged: Vec<Product> = enforced
            .into_iter()
            .chain(open)
            .filter(|p| seen.insert(p.id.clone()))
            .take(limit.min(self.vector_pool_cap))
            .collect();
        debug!(returned = merged.len(), "vector expansion");
        Ok(merged)
    }

    pub async fn filter_only(
        &self,
        hard: &HardFilters,
        soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError> {
        self.repository
            .filter_only_query(hard, soft, limit, exclude)
            .instrument(retrieval_span!("filter_only", limit))
            .await
    }

    pub async fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RetrievalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.fetch_by_ids(ids).await
    }

    pub async fn sweep_by_category(
        &self,
        categories: &[String],
        hard: &HardFilters,
        cap: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        self.repository
            .sweep_by_category(categories, hard, cap, exclude)
            .instrument(retrieval_span!("sweep", cap))
            .await
    }
}

impl std::fmt::Debug for CandidateRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateRetriever")
            .field("max_fuzzy_tokens", &self.max_fuzzy_tokens)
            .field("vector_pool_cap", &self.vector_pool_cap)
            .finish_non_exhaustive()
    }
}
