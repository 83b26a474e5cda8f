use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use aisle_core::config::AisleConfig;
use aisle_core::errors::{AisleError, SessionError};
use aisle_core::models::{
    Candidate, Complexity, PipelinePath, RawExtraction, StoreContext, TierTag, UserProfile,
};
use aisle_core::traits::{SessionStore, Versioned};
use aisle_pipeline::{PipelineOrchestrator, PipelineServices, SearchPage, SearchRequest};
use aisle_session::{ContinuationToken, InMemorySessionStore};
use async_trait::async_trait;
use test_fixtures::{
    wine_store_vocabulary, FakeMode, HashEmbedder, InMemoryOverrideStore, InMemoryProductRepository,
    InMemoryProfileStore, ScriptedClassifier, ScriptedExtractor, ScriptedReranker,
    ScriptedValidator,
};

const PASTA_QUERY: &str = "italian red wine for pasta";

struct Harness {
    repo: Arc<InMemoryProductRepository>,
    classifier: Arc<ScriptedClassifier>,
    extractor: Arc<ScriptedExtractor>,
    reranker: Arc<ScriptedReranker>,
    validator: Arc<ScriptedValidator>,
    engine: PipelineOrchestrator,
}

impl Harness {
    async fn search(&self, query: &str) -> SearchPage {
        self.search_in(query, store()).await
    }

    async fn search_in(&self, query: &str, store: StoreContext) -> SearchPage {
        self.engine
            .search(SearchRequest::new(query, store))
            .await
            .unwrap_or_else(|e| panic!("search {query:?} failed: {e}"))
    }

    fn ai_calls(&self) -> usize {
        self.classifier.calls()
            + self.extractor.calls()
            + self.reranker.calls()
            + self.validator.validate_calls()
            + self.validator.select_calls()
    }
}

fn build(
    config: AisleConfig,
    classifier: ScriptedClassifier,
    extractor: ScriptedExtractor,
    extra: impl FnOnce(PipelineServices) -> PipelineServices,
) -> Harness {
    let repo = Arc::new(InMemoryProductRepository::wine_store());
    let classifier = Arc::new(classifier);
    let extractor = Arc::new(extractor);
    let reranker = Arc::new(ScriptedReranker::new());
    let validator = Arc::new(ScriptedValidator::new());
    let services = PipelineServices::new(
        repo.clone(),
        Arc::new(HashEmbedder::default()),
        classifier.clone(),
        extractor.clone(),
        reranker.clone(),
        validator.clone(),
        Arc::new(InMemorySessionStore::new()),
    );
    let engine = PipelineOrchestrator::new(extra(services), config).unwrap();
    Harness {
        repo,
        classifier,
        extractor,
        reranker,
        validator,
        engine,
    }
}

fn harness() -> Harness {
    build(AisleConfig::default(), ScriptedClassifier::new(), ScriptedExtractor::new(), |s| s)
}

fn pasta_extractor() -> ScriptedExtractor {
    ScriptedExtractor::new().with_extraction(
        PASTA_QUERY,
        RawExtraction {
            category: vec!["Red Wine".into()],
            soft_category: vec!["Italy".into(), "Pasta".into()],
            ..Default::default()
        },
    )
}

fn store() -> StoreContext {
    StoreContext {
        store_id: "wine-store".into(),
        description: "Israeli wine and spirits shop".into(),
        vocabulary: wine_store_vocabulary(),
        page_size: None,
        explain: false,
    }
}

fn in_category(c: &Candidate, category: &str) -> bool {
    c.product.category.iter().any(|x| x == category)
}

fn assert_unique(ids: &[&str]) {
    let unique: HashSet<&&str> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
}

// ---- filter-only fast path ----

#[tokio::test]
async fn fully_explained_query_skips_ai_and_sorts_by_price() {
    let h = harness();
    let page = h.search("red wine").await;

    assert_eq!(page.path, PipelinePath::FilterOnlyFast);
    assert_eq!(page.items.len(), 15);
    assert!(page.items.iter().all(|c| in_category(c, "Red Wine")));
    assert!(page
        .items
        .windows(2)
        .all(|w| w[0].product.price <= w[1].product.price));
    assert_eq!(h.ai_calls(), 0);
    assert!(!page.has_more);
    assert!(page.continuation_token.is_none());
    assert!(!page.is_degraded());
}

#[tokio::test]
async fn price_constraint_is_never_violated() {
    let h = harness();
    let page = h.search("white wine under 100").await;

    assert_eq!(page.path, PipelinePath::FilterOnlyFast);
    assert_eq!(page.filters.hard.max_price, Some(100.0));
    let mut ids = page.ids();
    ids.sort_unstable();
    assert_eq!(ids, ["w01", "w02", "w04", "w05", "w06"]);
    assert!(page
        .items
        .iter()
        .all(|c| in_category(c, "White Wine") && c.product.price <= 100.0));
}

#[tokio::test]
async fn soft_matches_lead_without_excluding_others() {
    let h = harness();
    let page = h.search("red wine italy").await;

    assert_eq!(page.path, PipelinePath::FilterOnlyFast);
    assert_eq!(page.items.len(), 15);
    assert!(page.ids().contains(&"r05"), "French wine must not be filtered out");

    let italian = |c: &Candidate| c.product.soft_category.iter().any(|s| s == "Italy");
    let last_italian = page.items.iter().rposition(italian).unwrap();
    let first_other = page.items.iter().position(|c| !italian(c)).unwrap();
    assert!(last_italian < first_other);
    assert_eq!(first_other, 7);

    // Price order holds within each group, not across the boundary.
    let (soft, rest) = page.items.split_at(first_other);
    for group in [soft, rest] {
        assert!(group.windows(2).all(|w| w[0].product.price <= w[1].product.price));
    }
}

// ---- two-step ----

#[tokio::test]
async fn unique_product_hit_brings_priced_recommendations() {
    let h = harness();
    let page = h.search("Pavillon Rouge du Chateau Margaux").await;

    assert_eq!(page.path, PipelinePath::TwoStep);
    assert_eq!(page.ids(), ["r05", "r02", "r06", "r07", "r08", "r09"]);
    for rec in &page.items[1..] {
        assert_eq!(rec.tier, TierTag::Similarity);
        assert!(in_category(rec, "Red Wine"));
        assert!((180.0..=420.0).contains(&rec.product.price));
    }
    assert!(page.items[1].product.on_sale && page.items[2].product.on_sale);
    // The exact name hit settles complexity without asking the classifier.
    assert_eq!(h.classifier.complexity_calls(), 0);
    assert_eq!(h.reranker.calls(), 0);
}

#[tokio::test]
async fn weak_text_hits_are_validated_before_expansion() {
    let h = harness();
    let page = h.search("juicy everyday").await;

    assert_eq!(page.path, PipelinePath::TwoStep);
    assert_eq!(h.validator.validate_calls(), 1);
    assert_eq!(page.ids()[0], "r03");
    assert!(page.items[1..]
        .iter()
        .all(|c| c.tier == TierTag::CategoryExpansion));
    assert_unique(&page.ids());
}

#[tokio::test]
async fn learned_override_routes_without_classifier() {
    let overrides = Arc::new(InMemoryOverrideStore::new().with_override(PASTA_QUERY, Complexity::Simple));
    let o = overrides.clone();
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), pasta_extractor(), move |s| {
        s.with_overrides(o)
    });

    let page = h.search(PASTA_QUERY).await;

    assert_eq!(page.path, PipelinePath::TwoStep);
    assert_eq!(overrides.calls(), 1);
    assert_eq!(h.classifier.complexity_calls(), 0);
    assert_eq!(h.reranker.calls(), 0);
    assert!(!page.items.is_empty());
    assert!(page.items.iter().all(|c| in_category(c, "Red Wine")));
}

// ---- complex rerank ----

#[tokio::test]
async fn complex_query_is_reranked_within_bounds() {
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), pasta_extractor(), |s| s);
    let page = h.search(PASTA_QUERY).await;

    assert_eq!(page.path, PipelinePath::Complex);
    assert_eq!(h.reranker.calls(), 1);
    let request = h.reranker.last_request().unwrap();
    assert!(request.candidates.len() <= 25);
    assert!(request.max_results <= 10);
    assert!(!request.explain);

    assert!(page.filters.hard.category.iter().any(|c| c == "Red Wine"));
    assert!(!page.items.is_empty());
    assert!(page.items.iter().all(|c| in_category(c, "Red Wine")));
    assert_unique(&page.ids());

    let reranked: Vec<&str> = request
        .candidates
        .iter()
        .take(request.max_results)
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(&page.ids()[..reranked.len()], reranked.as_slice());
}

#[tokio::test]
async fn reranker_order_replaces_fused_order() {
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), pasta_extractor(), |s| s);
    h.reranker.set_reverse(true);

    let page = h.search(PASTA_QUERY).await;

    let request = h.reranker.last_request().unwrap();
    let last_offered = request.candidates.last().unwrap().id.as_str();
    assert_eq!(page.ids()[0], last_offered);
    assert_unique(&page.ids());
}

#[tokio::test]
async fn invented_rerank_ids_are_dropped() {
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), pasta_extractor(), |s| s);
    h.reranker.set_invent_id(true);

    let page = h.search(PASTA_QUERY).await;

    assert!(!page.ids().contains(&ScriptedReranker::INVENTED_ID));
    assert!(!page.items.is_empty());
    assert_unique(&page.ids());
}

#[tokio::test]
async fn rerank_timeouts_open_the_circuit() {
    let queries = [
        PASTA_QUERY,
        "red wine for a steak dinner",
        "smooth red wine for a party",
        "red wine to bring to friends",
    ];
    let extractor = queries.iter().fold(ScriptedExtractor::new(), |e, q| {
        e.with_extraction(
            *q,
            RawExtraction {
                category: vec!["Red Wine".into()],
                ..Default::default()
            },
        )
    });
    let mut config = AisleConfig::default();
    config.resilience.ai_timeout_ms = 20;
    let h = build(config, ScriptedClassifier::new(), extractor, |s| s);
    h.reranker.set_mode(FakeMode::Hang(Duration::from_millis(200)));
    let explaining = StoreContext {
        explain: true,
        ..store()
    };

    let mut pages = Vec::new();
    for q in queries {
        pages.push(h.search_in(q, explaining.clone()).await);
    }
    let page = pages.pop().unwrap();

    // Three timeouts on different queries trip the breaker even though
    // classification and extraction keep succeeding in between.
    assert_eq!(h.reranker.calls(), 3);
    assert!(h.engine.gateway().is_open());
    assert_eq!(
        h.engine.gateway().open_breaker().map(|b| b.name().to_string()).as_deref(),
        Some("rerank")
    );
    assert!(page.degraded("rerank"));
    assert!(!page.items.is_empty());
    assert!(page.items.iter().all(|c| c.explanation.is_none()));
    assert!(page.items.iter().all(|c| in_category(c, "Red Wine")));
}

#[tokio::test]
async fn total_ai_outage_still_serves_results() {
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), pasta_extractor(), |s| s);
    h.classifier.set_mode(FakeMode::Fail);
    h.extractor.set_mode(FakeMode::Fail);
    h.reranker.set_mode(FakeMode::Fail);
    h.validator.set_mode(FakeMode::Fail);

    let page = h.search(PASTA_QUERY).await;

    assert_eq!(page.path, PipelinePath::Complex);
    assert!(!page.items.is_empty());
    assert!(page.items.iter().all(|c| in_category(c, "Red Wine")));
    assert!(page.degraded("classify_complexity"));
    assert!(page.degraded("extract_filters"));
    assert!(page.degraded("rerank"));
    assert_eq!(h.reranker.calls(), 1);
    assert_eq!(h.engine.gateway().breaker("rerank").consecutive_failures(), 1);
}

#[tokio::test]
async fn failing_text_source_falls_back_to_vectors() {
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), pasta_extractor(), |s| s);
    h.repo.set_text_failing(true);

    let page = h.search(PASTA_QUERY).await;

    assert!(page.degraded("text_search"));
    assert!(!page.items.is_empty());
    assert!(page.items.iter().all(|c| in_category(c, "Red Wine")));
}

// ---- emergency expansion and zero-result fallback ----

#[tokio::test]
async fn thin_category_triggers_emergency_selection() {
    let h = harness();
    let page = h.search("sparkling wine").await;

    assert_eq!(page.path, PipelinePath::FilterOnlyFast);
    assert!(page.already_ordered);
    assert_eq!(h.validator.select_calls(), 1);
    let mut ids = page.ids();
    ids.sort_unstable();
    assert_eq!(ids, ["s01", "s02"]);
}

#[tokio::test]
async fn impossible_filters_fall_back_to_plain_text() {
    let h = harness();
    let page = h.search("beer over 500").await;

    assert_eq!(page.path, PipelinePath::ZeroResultFallback);
    assert!(page.ids().contains(&"b01"));
    assert!(page.filters.is_empty());
}

// ---- pagination ----

#[tokio::test]
async fn load_more_drains_every_result_once() {
    let h = harness();
    let small_pages = StoreContext {
        page_size: Some(3),
        ..store()
    };

    let first = h.search_in("red wine", small_pages.clone()).await;
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.batch_number, 1);
    assert!(first.has_more);

    let mut seen: Vec<String> = first.ids().iter().map(|s| s.to_string()).collect();
    let mut token = first.continuation_token.clone();
    let mut batch = 1;
    while let Some(t) = token {
        let page = h.engine.load_more(&t, small_pages.clone()).await.unwrap();
        batch += 1;
        assert_eq!(page.batch_number, batch);
        assert_eq!(page.path, PipelinePath::FilterOnlyFast);
        seen.extend(page.ids().iter().map(|s| s.to_string()));
        token = page.continuation_token;
    }

    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(seen.len(), 15);
    assert_eq!(unique.len(), 15);
    assert_eq!(batch, 5);
}

/// Session store that yields to the scheduler around every read and
/// conditional write, so concurrent load-mores interleave.
#[derive(Default)]
struct YieldingSessionStore(InMemorySessionStore);

#[async_trait]
impl SessionStore for YieldingSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, SessionError> {
        tokio::task::yield_now().await;
        let value = self.0.get(key).await;
        tokio::task::yield_now().await;
        value
    }
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<u64, SessionError> {
        self.0.set(key, value, ttl).await
    }
    async fn compare_and_swap(
        &self,
        key: &str,
        expected_revision: u64,
        value: String,
        ttl: Duration,
    ) -> Result<Option<u64>, SessionError> {
        tokio::task::yield_now().await;
        self.0.compare_and_swap(key, expected_revision, value, ttl).await
    }
    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.0.delete(key).await
    }
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, SessionError> {
        self.0.scan_prefix(prefix).await
    }
}

#[tokio::test]
async fn concurrent_load_more_never_repeats_products() {
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), ScriptedExtractor::new(), |mut s| {
        s.sessions = Arc::new(YieldingSessionStore::default());
        s
    });
    let small_pages = StoreContext {
        page_size: Some(3),
        ..store()
    };
    let first = h.search_in("red wine", small_pages.clone()).await;
    let token = first.continuation_token.clone().unwrap();

    let (a, b) = tokio::join!(
        h.engine.load_more(&token, small_pages.clone()),
        h.engine.load_more(&token, small_pages.clone()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let mut batches = [a.batch_number, b.batch_number];
    batches.sort_unstable();
    assert_eq!(batches, [2, 3]);

    let mut all: Vec<&str> = first.ids();
    all.extend(a.ids());
    all.extend(b.ids());
    assert_eq!(all.len(), 9);
    assert_unique(&all);

    let session_id = ContinuationToken::decode(&token).unwrap().session_id;
    let session = h.engine.sessions().get(&session_id).await.unwrap();
    assert_eq!(session.batch_number, 3);
    assert_eq!(session.delivered_ids.len(), 9);
}

#[tokio::test]
async fn depth_limit_ends_pagination() {
    let mut config = AisleConfig::default();
    config.session.max_depth = 3;
    let h = build(config, ScriptedClassifier::new(), ScriptedExtractor::new(), |s| s);
    let small_pages = StoreContext {
        page_size: Some(3),
        ..store()
    };

    let mut token = h
        .search_in("red wine", small_pages.clone())
        .await
        .continuation_token
        .unwrap();
    for _ in 0..2 {
        let page = h.engine.load_more(&token, small_pages.clone()).await.unwrap();
        token = page.continuation_token.unwrap();
    }

    let err = h.engine.load_more(&token, small_pages).await.unwrap_err();
    assert!(matches!(
        err,
        AisleError::SessionError(SessionError::MaxDepthExceeded { max_depth: 3, requested: 4 })
    ));
    assert!(err.is_user_visible());
}

#[tokio::test]
async fn load_more_rejects_bad_tokens() {
    let h = harness();
    let small_pages = StoreContext {
        page_size: Some(3),
        ..store()
    };
    let token = h
        .search_in("red wine", small_pages.clone())
        .await
        .continuation_token
        .unwrap();

    let garbage = h.engine.load_more("not-a-token", store()).await.unwrap_err();
    assert!(matches!(garbage, AisleError::SessionError(SessionError::InvalidToken { .. })));

    let foreign = StoreContext {
        store_id: "another-store".into(),
        ..small_pages.clone()
    };
    let err = h.engine.load_more(&token, foreign).await.unwrap_err();
    assert!(matches!(err, AisleError::SessionError(SessionError::InvalidToken { .. })));
    assert!(err.is_user_visible());
}

#[tokio::test]
async fn deleted_session_requires_restart() {
    let h = harness();
    let small_pages = StoreContext {
        page_size: Some(3),
        ..store()
    };
    let token = h
        .search_in("red wine", small_pages.clone())
        .await
        .continuation_token
        .unwrap();
    let decoded = ContinuationToken::decode(&token).unwrap();
    h.engine.sessions().delete(&decoded.session_id).await.unwrap();

    let err = h.engine.load_more(&token, small_pages).await.unwrap_err();
    assert!(matches!(err, AisleError::SessionError(SessionError::Expired { .. })));
    assert!(err.is_user_visible());
}

// ---- profile and request validation ----

#[tokio::test]
async fn profile_sets_secondary_boost() {
    let profiles = Arc::new(InMemoryProfileStore::new().with_profile(UserProfile {
        session_id: "shopper-1".into(),
        preferred_soft_categories: vec!["Italy".into()],
        ..Default::default()
    }));
    let p = profiles.clone();
    let h = build(AisleConfig::default(), ScriptedClassifier::new(), ScriptedExtractor::new(), move |s| {
        s.with_profiles(p)
    });

    let page = h
        .engine
        .search(SearchRequest::new("red wine", store()).with_profile("shopper-1"))
        .await
        .unwrap();

    assert_eq!(profiles.calls(), 1);
    let boost = |id: &str| page.items.iter().find(|c| c.product.id == id).unwrap().profile_boost;
    assert!(boost("r01") > 0.0);
    assert_eq!(boost("r05"), 0.0);
    assert!(page
        .items
        .windows(2)
        .all(|w| w[0].product.price <= w[1].product.price));
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let h = harness();
    let err = h
        .engine
        .search(SearchRequest::new("   ", store()))
        .await
        .unwrap_err();

    assert!(matches!(err, AisleError::InvalidRequest { .. }));
    assert!(err.is_user_visible());
    assert_eq!(h.repo.text_calls(), 0);
}
