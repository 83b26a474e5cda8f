use std::collections::HashSet;
use std::sync::Arc;

use aisle_core::config::AisleConfig;
use aisle_core::models::{PipelinePath, StoreContext};
use aisle_pipeline::gate;
use aisle_pipeline::{PipelineOrchestrator, PipelineServices, SearchRequest};
use aisle_session::InMemorySessionStore;
use proptest::prelude::*;
use test_fixtures::{
    wine_store_vocabulary, HashEmbedder, InMemoryProductRepository, ScriptedClassifier,
    ScriptedExtractor, ScriptedReranker, ScriptedValidator,
};

fn engine() -> PipelineOrchestrator {
    let services = PipelineServices::new(
        Arc::new(InMemoryProductRepository::wine_store()),
        Arc::new(HashEmbedder::default()),
        Arc::new(ScriptedClassifier::new()),
        Arc::new(ScriptedExtractor::new()),
        Arc::new(ScriptedReranker::new()),
        Arc::new(ScriptedValidator::new()),
        Arc::new(InMemorySessionStore::new()),
    );
    PipelineOrchestrator::new(services, AisleConfig::default()).unwrap()
}

fn store() -> StoreContext {
    StoreContext {
        store_id: "wine-store".into(),
        vocabulary: wine_store_vocabulary(),
        ..Default::default()
    }
}

fn query() -> impl Strategy<Value = String> {
    (
        prop::option::of("nice|cheap|smooth"),
        "red wine|white wine|sparkling wine|whisky|beer",
        prop::option::of("italy|france|israel|gift"),
        prop::option::of("under 100|over 150|between 50 and 200"),
    )
        .prop_map(|(noise, category, soft, price)| {
            [noise, Some(category), soft, price]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_item_passes_the_hard_filters(q in query()) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let page = rt.block_on(engine().search(SearchRequest::new(q.clone(), store()))).unwrap();

        if page.path != PipelinePath::ZeroResultFallback {
            for item in &page.items {
                prop_assert!(
                    gate::passes(&item.product, &page.filters.hard, &q),
                    "{} violates {:?} for {:?}", item.product.id, page.filters.hard, q
                );
            }
        }
        let ids: HashSet<&str> = page.ids().into_iter().collect();
        prop_assert_eq!(ids.len(), page.items.len());
    }

    #[test]
    fn pages_never_exceed_the_page_size(q in query(), size in 1usize..6) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let store = StoreContext { page_size: Some(size), ..store() };
        let page = rt.block_on(engine().search(SearchRequest::new(q, store))).unwrap();

        prop_assert!(page.items.len() <= size);
        prop_assert_eq!(page.has_more, page.continuation_token.is_some());
    }
}
