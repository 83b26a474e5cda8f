//! PipelineOrchestrator: entry decision, state loop, and page assembly.

use std::sync::Arc;
use std::time::{Duration, Instant};

use aisle_core::config::AisleConfig;
use aisle_core::errors::{AisleError, AisleResult, RetrievalError, SessionError};
use aisle_core::models::{
    Candidate, ExtractedFilters, HardFilters, PipelinePath, ProductId, SessionExtra, SoftFilters,
    StoreContext, TierTag, UserProfile,
};
use aisle_core::text::normalize_text;
use aisle_core::traits::{EmbeddingService, ProfileStore, Reranker, ValidationService};
use aisle_extraction::{FilterExtractor, QueryClassifier};
use aisle_observability::{events, load_more_span, search_span, DegradationTracker};
use aisle_resilience::{Cache, ResilientGateway};
use aisle_retrieval::{CachedEmbedder, CandidateRetriever};
use aisle_scoring::{profile_boost, BoostWeights, ScoreFusion};
use aisle_session::{ContinuationToken, PaginationSessionManager};
use chrono::Utc;
use tracing::{debug, info, Instrument};

use crate::gate;
use crate::request::{SearchPage, SearchRequest};
use crate::services::PipelineServices;
use crate::state::{PipelineState, RequestContext};

/// Runs searches and load-more requests. One instance serves every store;
/// the circuit breakers and cache inside are shared by all requests.
pub struct PipelineOrchestrator {
    pub(crate) config: AisleConfig,
    pub(crate) fusion: ScoreFusion,
    pub(crate) gateway: ResilientGateway,
    pub(crate) retriever: CandidateRetriever,
    pub(crate) classifier: QueryClassifier,
    pub(crate) extractor: FilterExtractor,
    pub(crate) reranker: Arc<dyn Reranker>,
    pub(crate) validator: Arc<dyn ValidationService>,
    pub(crate) sessions: PaginationSessionManager,
    pub(crate) profiles: Option<Arc<dyn ProfileStore>>,
}

impl PipelineOrchestrator {
    pub fn new(services: PipelineServices, config: AisleConfig) -> AisleResult<Self> {
        config.validate()?;
        let resilience = &config.resilience;

        let gateway = ResilientGateway::from_config(resilience);
        let cache = match services.cache {
            Some(backend) => Cache::new(backend),
            None => Cache::in_memory(resilience.cache_capacity),
        };

        let embedder: Arc<dyn EmbeddingService> = Arc::new(CachedEmbedder::new(
            services.embedder,
            cache.clone(),
            Duration::from_secs(resilience.embedding_ttl_secs),
        ));
        let retriever = CandidateRetriever::new(services.repository, embedder, &config.pipeline);

        let mut classifier = QueryClassifier::new(
            services.classifier,
            gateway.clone(),
            cache.clone(),
            Duration::from_secs(resilience.classification_ttl_secs),
        );
        if let Some(overrides) = services.overrides {
            classifier = classifier.with_overrides(overrides);
        }
        let extractor = FilterExtractor::new(
            services.extractor,
            gateway.clone(),
            cache,
            Duration::from_secs(resilience.extraction_ttl_secs),
        );

        Ok(Self {
            fusion: ScoreFusion::new(config.scoring.clone()),
            gateway,
            retriever,
            classifier,
            extractor,
            reranker: services.reranker,
            validator: services.validator,
            sessions: PaginationSessionManager::new(services.sessions, config.session.clone()),
            profiles: services.profiles,
            config,
        })
    }

    pub fn config(&self) -> &AisleConfig {
        &self.config
    }

    /// The gateway every AI call goes through.
    pub fn gateway(&self) -> &ResilientGateway {
        &self.gateway
    }

    pub fn sessions(&self) -> &PaginationSessionManager {
        &self.sessions
    }

    /// First page for `request.query`.
    pub async fn search(&self, request: SearchRequest) -> AisleResult<SearchPage> {
        let span = search_span!(request.store.store_id, request.query);
        self.search_inner(request).instrument(span).await
    }

    async fn search_inner(&self, request: SearchRequest) -> AisleResult<SearchPage> {
        let started = Instant::now();
        let query = request.query.trim().to_string();
        if normalize_text(&query).is_empty() {
            return Err(AisleError::InvalidRequest {
                reason: "empty query".to_string(),
            });
        }

        let p = &self.config.pipeline;
        let page_size = request.store.page_size.unwrap_or(p.default_page_size);
        let mut cx = RequestContext::new(query, request.store, page_size);
        cx.profile = self
            .load_profile(request.profile_session_id.as_deref(), &mut cx.tracker)
            .await;

        // Step 1: rule-based reading. Fully explained queries never touch AI.
        let rules = self.extractor.extract_rules(&cx.query, &cx.store.vocabulary);
        let coverage = rules.coverage();
        if !rules.filters.is_empty() && (coverage >= p.filter_only_coverage || rules.rules.price_only) {
            cx.filters = rules.filters;
            cx.rejected = rules.rejected;
            cx.path = PipelinePath::FilterOnlyFast;
            events::path_selected(cx.path.as_str(), &cx.query, &format!("coverage {coverage:.2}"));
            self.drive(&mut cx, PipelineState::FilterOnlyFast).await;
            return self.finish(cx, started).await;
        }

        // Step 2: preliminary text search. A near-perfect hit marks the query as simple.
        let preliminary_hard = rules.filters.hard.without_category();
        let preliminary = self
            .retriever
            .text_search(&cx.query, &preliminary_hard, &rules.filters.soft, p.tier1_limit, &cx.exclude)
            .await;
        let prior_text_match = match preliminary {
            Ok(hits) => {
                let prior = hits.iter().any(|h| {
                    self.fusion.scorer().bonus(&h.name, &cx.query) >= p.near_perfect_threshold
                });
                cx.preliminary = Some((preliminary_hard, hits));
                prior
            }
            Err(e) => {
                cx.tracker.note("preliminary_text_search", "no_prior_match", e.to_string());
                false
            }
        };

        // Step 3: classify and extract concurrently.
        let context = cx.query_context(prior_text_match);
        let (classification, extraction) = tokio::join!(
            self.classifier.classify(&cx.query, &context),
            self.extractor.extract(&cx.query, &cx.store.vocabulary, &context),
        );
        if let Some(reason) = &classification.fallback_reason {
            cx.tracker.note("classify_complexity", "rules", reason.clone());
        }
        if let Some(reason) = &extraction.fallback_reason {
            cx.tracker.note("extract_filters", "rules", reason.clone());
        }
        cx.filters = extraction.filters;
        cx.filters.hard.category.truncate(p.max_extracted_categories);
        cx.rejected = extraction.rejected;

        // Step 4: route.
        let (path, state) = if classification.complexity.is_simple() {
            (PipelinePath::TwoStep, PipelineState::TwoStepTier1)
        } else {
            (PipelinePath::Complex, PipelineState::ComplexRerank)
        };
        cx.path = path;
        events::path_selected(
            path.as_str(),
            &cx.query,
            &format!("{:?} via {:?}", classification.complexity, classification.source),
        );
        self.drive(&mut cx, state).await;
        self.finish(cx, started).await
    }

    /// Next page for a continuation token issued by this engine.
    pub async fn load_more(&self, token: &str, store: StoreContext) -> AisleResult<SearchPage> {
        let started = Instant::now();
        let decoded =
            ContinuationToken::decode_fresh(token, Utc::now(), self.config.session.token_ttl_secs)?;
        if decoded.store_id != store.store_id {
            return Err(SessionError::InvalidToken {
                reason: "token was issued for another store".to_string(),
            }
            .into());
        }

        let attempts = self.config.session.cas_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.load_next_batch(decoded.clone(), store.clone(), started).await {
                Err(AisleError::SessionError(SessionError::Conflict { .. })) if attempt < attempts => {
                    debug!(session_id = %decoded.session_id, attempt, "load-more raced, rebuilding page");
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Build the batch after the one the session currently records,
    /// excluding everything it has delivered.
    async fn load_next_batch(
        &self,
        decoded: ContinuationToken,
        store: StoreContext,
        started: Instant,
    ) -> AisleResult<SearchPage> {
        let session = self.sessions.get(&decoded.session_id).await?;
        let next_batch = session.batch_number + 1;
        let max_depth = self.config.session.max_depth;
        if next_batch > max_depth {
            events::session_depth_limit(&session.session_id, max_depth);
            return Err(SessionError::MaxDepthExceeded {
                max_depth,
                requested: next_batch,
            }
            .into());
        }

        let span = load_more_span!(session.session_id, next_batch);
        async move {
            let page_size = store.page_size.unwrap_or(self.config.pipeline.default_page_size);
            let mut cx = RequestContext::new(decoded.query, store, page_size);
            cx.filters = decoded.filters;
            cx.path = decoded.path;
            cx.exclude = session.delivered_ids.clone();
            cx.derived_categories = session.extra.extracted_categories.clone().unwrap_or_default();
            cx.embedding = session
                .extra
                .seed_embeddings
                .as_ref()
                .and_then(|seeds| seeds.first().cloned());
            cx.session = Some(session);

            let state = PipelineState::resume(cx.path);
            if cx.path == PipelinePath::ZeroResultFallback {
                self.zero_result_fallback(&mut cx).await?;
            }
            self.drive(&mut cx, state).await;
            self.finish(cx, started).await
        }
        .instrument(span)
        .await
    }

    /// Run states until `Done`.
    async fn drive(&self, cx: &mut RequestContext, mut state: PipelineState) {
        loop {
            debug!(state = state.as_str(), candidates = cx.candidates.len(), "pipeline state");
            state = match state {
                PipelineState::FilterOnlyFast => self.filter_only_fast(cx).await,
                PipelineState::TwoStepTier1 => self.tier1(cx).await,
                PipelineState::TwoStepTier2 => self.tier2(cx).await,
                PipelineState::ComplexRerank => self.complex_rerank(cx).await,
                PipelineState::EmergencyExpansion => self.emergency_expansion(cx).await,
                PipelineState::Done => return,
            };
        }
    }

    /// Where a path goes when it has produced its candidates.
    pub(crate) fn after_path(&self, cx: &RequestContext) -> PipelineState {
        let needs_expansion = !cx.is_load_more()
            && !cx.emergency_done
            && cx.filters.hard.has_category()
            && cx.candidates.len() < self.config.pipeline.emergency_min_results;
        if needs_expansion {
            PipelineState::EmergencyExpansion
        } else {
            PipelineState::Done
        }
    }

    /// Soft-category weights: the query's own categories over derived ones.
    pub(crate) fn weights(&self, cx: &RequestContext) -> BoostWeights {
        BoostWeights::query_over_derived(
            &cx.filters.soft.soft_category,
            &cx.derived_soft,
            self.fusion.config(),
        )
    }

    /// Apply the profile boost (if any) and sort with the fusion comparator.
    pub(crate) fn rank(&self, cx: &RequestContext, candidates: &mut [Candidate], soft: &SoftFilters) {
        if let Some(profile) = &cx.profile {
            profile_boost::apply(candidates, profile, self.fusion.config().profile_boost_weight);
        }
        self.fusion.sort(candidates, !soft.is_empty());
    }

    /// The query embedding, computed once per request.
    pub(crate) async fn ensure_embedding(&self, cx: &mut RequestContext) -> Option<Vec<f32>> {
        if cx.embedding.is_none() {
            match self.retriever.embed(&cx.query).await {
                Ok(embedding) => cx.embedding = Some(embedding),
                Err(e) => cx.tracker.note("embedding", "text_only", e.to_string()),
            }
        }
        cx.embedding.clone()
    }

    async fn load_profile(
        &self,
        session_id: Option<&str>,
        tracker: &mut DegradationTracker,
    ) -> Option<UserProfile> {
        let (Some(store), Some(session_id)) = (&self.profiles, session_id) else {
            return None;
        };
        match store.get_profile(session_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracker.note("profile", "unboosted", e.to_string());
                None
            }
        }
    }

    /// One unfiltered plain-text retrieval, used when every strategy came
    /// back empty.
    async fn zero_result_fallback(&self, cx: &mut RequestContext) -> AisleResult<()> {
        let limit = self.config.pipeline.tier1_limit;
        let result = self
            .retriever
            .text_search(&cx.query, &HardFilters::default(), &SoftFilters::default(), limit, &cx.exclude)
            .await;
        match result {
            Ok(products) => {
                info!(query = %cx.query, found = products.len(), "zero results, unfiltered text fallback");
                cx.candidates = self.fusion.fuse(
                    products,
                    Vec::new(),
                    &cx.query,
                    &SoftFilters::default(),
                    &BoostWeights::uniform(self.fusion.config().unweighted_category_weight),
                    TierTag::TextMatch,
                );
                cx.filters = ExtractedFilters::default();
                cx.path = PipelinePath::ZeroResultFallback;
                cx.already_ordered = false;
                Ok(())
            }
            Err(e) => match cx.retrieval_failure.take() {
                Some(first) => Err(RetrievalError::AllSourcesFailed {
                    reasons: vec![first.to_string(), e.to_string()],
                }
                .into()),
                None => {
                    cx.tracker.note("zero_result_fallback", "empty_page", e.to_string());
                    Ok(())
                }
            },
        }
    }

    /// The `Done` state: gate, fall back if empty, cut the page, and record
    /// it in the pagination session.
    async fn finish(&self, mut cx: RequestContext, started: Instant) -> AisleResult<SearchPage> {
        cx.candidates = gate::apply(
            std::mem::take(&mut cx.candidates),
            &cx.filters.hard,
            &cx.query,
            &cx.exclude,
        );

        if cx.candidates.is_empty() {
            if cx.is_load_more() {
                if let Some(e) = cx.retrieval_failure.take() {
                    return Err(e.into());
                }
            } else if cx.path != PipelinePath::ZeroResultFallback {
                self.zero_result_fallback(&mut cx).await?;
            }
        }

        let has_more = cx.candidates.len() > cx.page_size;
        cx.candidates.truncate(cx.page_size);
        let items = std::mem::take(&mut cx.candidates);
        let page_ids: Vec<ProductId> = items.iter().map(|c| c.id().clone()).collect();

        let (continuation_token, batch_number) = match cx.session.take() {
            Some(session) => {
                let updated = self
                    .sessions
                    .append_delivered(&session.session_id, &page_ids, session.batch_number)
                    .await?;
                let token = if has_more {
                    Some(self.issue_token(&cx, &updated.session_id, updated.delivered_ids.len())?)
                } else {
                    None
                };
                (token, updated.batch_number)
            }
            None if has_more => {
                let extra = SessionExtra {
                    extracted_categories: (!cx.derived_categories.is_empty())
                        .then(|| cx.derived_categories.clone()),
                    seed_embeddings: cx.embedding.clone().map(|e| vec![e]),
                };
                match self.sessions.create_session(page_ids.clone(), 1, extra).await {
                    Ok(session) => (
                        Some(self.issue_token(&cx, &session.session_id, page_ids.len())?),
                        1,
                    ),
                    Err(e) => {
                        cx.tracker.note("session", "single_page", e.to_string());
                        (None, 1)
                    }
                }
            }
            None => (None, 1),
        };

        let has_more = has_more && continuation_token.is_some();
        events::search_completed(
            cx.path.as_str(),
            items.len(),
            has_more,
            started.elapsed().as_millis() as u64,
        );

        Ok(SearchPage {
            items,
            path: cx.path,
            filters: cx.filters,
            continuation_token,
            batch_number,
            has_more,
            rejected_terms: cx.rejected,
            degradations: cx.tracker.into_events(),
            already_ordered: cx.already_ordered,
        })
    }

    fn issue_token(
        &self,
        cx: &RequestContext,
        session_id: &str,
        offset: usize,
    ) -> Result<String, SessionError> {
        ContinuationToken::new(
            cx.store.store_id.clone(),
            cx.query.clone(),
            cx.filters.clone(),
            offset,
            cx.path,
            session_id,
            Utc::now(),
        )
        .encode()
    }
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("gateway_open", &self.gateway.is_open())
            .field("retriever", &self.retriever)
            .finish_non_exhaustive()
    }
}
