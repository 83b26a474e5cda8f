use std::sync::Arc;

use aisle_core::traits::{
    CacheBackend, ClassifierService, EmbeddingService, FilterExtractionService,
    LearnedOverrideStore, ProductRepository, ProfileStore, Reranker, SessionStore,
    ValidationService,
};

/// Every external collaborator the orchestrator consumes. Shared across
/// requests.
#[derive(Clone)]
pub struct PipelineServices {
    pub repository: Arc<dyn ProductRepository>,
    pub embedder: Arc<dyn EmbeddingService>,
    pub classifier: Arc<dyn ClassifierService>,
    pub extractor: Arc<dyn FilterExtractionService>,
    pub reranker: Arc<dyn Reranker>,
    pub validator: Arc<dyn ValidationService>,
    pub sessions: Arc<dyn SessionStore>,
    pub profiles: Option<Arc<dyn ProfileStore>>,
    pub overrides: Option<Arc<dyn LearnedOverrideStore>>,
    /// Cache storage; an in-process moka cache when absent.
    pub cache: Option<Arc<dyn CacheBackend>>,
}

impl PipelineServices {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        embedder: Arc<dyn EmbeddingService>,
        classifier: Arc<dyn ClassifierService>,
        extractor: Arc<dyn FilterExtractionService>,
        reranker: Arc<dyn Reranker>,
        validator: Arc<dyn ValidationService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            repository,
            embedder,
            classifier,
            extractor,
            reranker,
            validator,
            sessions,
            profiles: None,
            overrides: None,
            cache: None,
        }
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_overrides(mut self, overrides: Arc<dyn LearnedOverrideStore>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_cache_backend(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl std::fmt::Debug for PipelineServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineServices")
            .field("profiles", &self.profiles.is_some())
            .field("overrides", &self.overrides.is_some())
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
