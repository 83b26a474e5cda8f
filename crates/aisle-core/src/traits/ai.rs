use async_trait::async_trait;

use crate::errors::AiError;
use crate::models::{
    CatalogVocabulary, Complexity, ProductId, QueryContext, RawExtraction, RerankCandidate,
    RerankRequest, RerankedItem, SpecificityVerdict,
};

/// AI-backed query classification.
#[async_trait]
pub trait ClassifierService: Send + Sync {
    async fn classify_complexity(
        &self,
        query: &str,
        context: &QueryContext,
    ) -> Result<Complexity, AiError>;

    async fn classify_specificity(
        &self,
        query: &str,
        context: &QueryContext,
    ) -> Result<SpecificityVerdict, AiError>;
}

/// Free text to structured filters. Output is unvalidated; callers check
/// every value against the vocabulary.
#[async_trait]
pub trait FilterExtractionService: Send + Sync {
    async fn extract(
        &self,
        query: &str,
        vocabulary: &CatalogVocabulary,
        context: &QueryContext,
    ) -> Result<RawExtraction, AiError>;
}

/// Returns an ordered subset of the request's candidate ids.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, request: &RerankRequest) -> Result<Vec<RerankedItem>, AiError>;
}

#[async_trait]
pub trait ValidationService: Send + Sync {
    /// Ids of weak text hits that are actually relevant to `query`.
    async fn validate_weak_matches(
        &self,
        candidates: &[RerankCandidate],
        query: &str,
    ) -> Result<Vec<ProductId>, AiError>;

    /// At most `max` ids of the most relevant candidates, best first.
    async fn select_relevant(
        &self,
        candidates: &[RerankCandidate],
        query: &str,
        max: usize,
    ) -> Result<Vec<ProductId>, AiError>;
}
