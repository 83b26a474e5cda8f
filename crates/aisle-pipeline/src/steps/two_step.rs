//! Simple queries: Tier 1 literal text matches, then Tier 2 category and
//! semantic expansion around what Tier 1 found.

use std::collections::HashSet;

use aisle_core::constants::MAX_WEAK_MATCH_VALIDATION;
use aisle_core::models::{Candidate, HardFilters, RerankCandidate, SoftFilters, TierTag};
use aisle_extraction::keep_most_specific;
use aisle_observability::ai_span;
use tracing::{debug, Instrument};

use crate::gate;
use crate::orchestrator::PipelineOrchestrator;
use crate::state::{PipelineState, RequestContext};

fn dedup_preserving(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(aisle_core::text::normalize_category(v)))
        .collect()
}

impl PipelineOrchestrator {
    pub(crate) async fn tier1(&self, cx: &mut RequestContext) -> PipelineState {
        let p = &self.config.pipeline;
        let hard = cx.filters.hard.without_category();

        let text = match cx.preliminary.take() {
            Some((preliminary_hard, hits)) if preliminary_hard == hard => Ok(hits),
            _ => {
                self.retriever
                    .text_search(&cx.query, &hard, &cx.filters.soft, p.tier1_limit, &cx.exclude)
                    .await
            }
        };
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                cx.fail_retrieval("text_search", "vector_expansion", e);
                return PipelineState::TwoStepTier2;
            }
        };

        let mut hits = self.fusion.fuse(
            text,
            Vec::new(),
            &cx.query,
            &cx.filters.soft,
            &self.weights(cx),
            TierTag::TextMatch,
        );
        hits.retain(|c| gate::passes(&c.product, &cx.filters.hard, &cx.query));
        let (mut strong, weak): (Vec<Candidate>, Vec<Candidate>) = hits
            .into_iter()
            .partition(|c| c.exact_match_bonus >= p.high_quality_threshold);

        if strong.is_empty() {
            if !cx.is_load_more() {
                cx.candidates = self.validate_weak(cx, weak).await;
            }
            return PipelineState::TwoStepTier2;
        }
        self.rank(cx, &mut strong, &cx.filters.soft);

        let near_perfect = strong
            .iter()
            .filter(|c| c.exact_match_bonus >= p.near_perfect_threshold)
            .count();
        if !cx.is_load_more() && strong.len() == 1 && near_perfect == 1 {
            let recommendations = self.recommendations(cx, &strong[0]).await;
            debug!(recommended = recommendations.len(), "unique product hit");
            strong.extend(recommendations);
            cx.candidates = strong;
            return self.after_path(cx);
        }

        if !cx.is_load_more() {
            self.derive_categories(cx, &strong);
        }
        let excellent = strong
            .iter()
            .filter(|c| c.exact_match_bonus >= p.excellent_threshold)
            .count();
        cx.candidates = strong;
        if excellent >= cx.page_size {
            debug!(excellent, "tier 1 fills the page");
            return self.after_path(cx);
        }
        PipelineState::TwoStepTier2
    }

    pub(crate) async fn tier2(&self, cx: &mut RequestContext) -> PipelineState {
        let Some(embedding) = self.ensure_embedding(cx).await else {
            return self.after_path(cx);
        };

        let categories = if cx.filters.hard.has_category() {
            cx.filters.hard.category.clone()
        } else {
            cx.derived_categories.clone()
        };
        let hard = cx.filters.hard.with_category(categories);
        let exclude = cx.seen_ids();

        let result = self
            .retriever
            .vector_expansion(
                &embedding,
                &hard,
                &cx.filters.soft,
                self.config.pipeline.tier2_limit,
                &exclude,
                &mut cx.tracker,
            )
            .await;

        match result {
            Ok(products) => {
                let boost = SoftFilters {
                    soft_category: dedup_preserving(
                        cx.filters
                            .soft
                            .soft_category
                            .iter()
                            .chain(&cx.derived_soft)
                            .cloned(),
                    ),
                    color: cx.filters.soft.color.clone(),
                };
                let mut expansion = self.fusion.fuse(
                    Vec::new(),
                    products,
                    &cx.query,
                    &boost,
                    &self.weights(cx),
                    TierTag::CategoryExpansion,
                );
                expansion.retain(|c| gate::passes(&c.product, &cx.filters.hard, &cx.query));
                self.rank(cx, &mut expansion, &boost);
                debug!(tier1 = cx.candidates.len(), tier2 = expansion.len(), "tier 2 expansion");
                cx.candidates.extend(expansion);
            }
            Err(e) if cx.candidates.is_empty() => {
                cx.fail_retrieval("vector_expansion", "empty", e)
            }
            Err(e) => cx.tracker.note("vector_expansion", "tier1_only", e.to_string()),
        }
        self.after_path(cx)
    }

    /// Ask the validator which weak text hits are actually relevant.
    async fn validate_weak(&self, cx: &mut RequestContext, weak: Vec<Candidate>) -> Vec<Candidate> {
        if weak.is_empty() {
            return weak;
        }
        let cap = self.config.pipeline.weak_match_cap.min(MAX_WEAK_MATCH_VALIDATION);
        let weak: Vec<Candidate> = weak.into_iter().take(cap).collect();
        let summaries: Vec<RerankCandidate> =
            weak.iter().map(|c| RerankCandidate::from(&c.product)).collect();

        let validator = self.validator.as_ref();
        let query = cx.query.as_str();
        let result = self
            .gateway
            .call("validate_weak_matches", || {
                validator.validate_weak_matches(&summaries, query)
            })
            .instrument(ai_span!("validate_weak_matches"))
            .await;

        match result {
            Ok(ids) => {
                let keep: HashSet<_> = ids.into_iter().collect();
                weak.into_iter().filter(|c| keep.contains(c.id())).collect()
            }
            Err(e) => {
                cx.tracker.note("validate_weak_matches", "vector_expansion", e.to_string());
                Vec::new()
            }
        }
    }

    /// Same-category alternatives to a unique hit, priced within the
    /// recommendation band, on-sale first and then closest in price.
    async fn recommendations(&self, cx: &mut RequestContext, anchor: &Candidate) -> Vec<Candidate> {
        let p = &self.config.pipeline;
        let price = anchor.product.price;
        let categories = keep_most_specific(anchor.product.category.clone());
        let band = HardFilters {
            category: categories.clone(),
            product_type: cx.filters.hard.product_type.clone(),
            price: None,
            min_price: Some(price * (1.0 - p.recommendation_price_band)),
            max_price: Some(price * (1.0 + p.recommendation_price_band)),
        };
        let mut exclude = cx.exclude.clone();
        exclude.insert(anchor.id().clone());

        match self
            .retriever
            .sweep_by_category(&categories, &band, p.sweep_cap, &exclude)
            .await
        {
            Ok(mut products) => {
                products.sort_by(|a, b| {
                    b.on_sale
                        .cmp(&a.on_sale)
                        .then_with(|| (a.price - price).abs().total_cmp(&(b.price - price).abs()))
                        .then_with(|| a.id.cmp(&b.id))
                });
                products
                    .into_iter()
                    .take(p.recommendation_count)
                    .map(|product| Candidate::new(product, TierTag::Similarity))
                    .collect()
            }
            Err(e) => {
                cx.tracker.note("sweep_by_category", "no_recommendations", e.to_string());
                Vec::new()
            }
        }
    }

    /// Up to `max_extracted_categories` hard categories, plus soft
    /// categories, from the strongest hits: a single near-perfect hit alone,
    /// else the top two near-perfect hits, else the top three.
    fn derive_categories(&self, cx: &mut RequestContext, strong: &[Candidate]) {
        let p = &self.config.pipeline;
        let near: Vec<&Candidate> = strong
            .iter()
            .filter(|c| c.exact_match_bonus >= p.near_perfect_threshold)
            .collect();
        let sources: Vec<&Candidate> = match near.len() {
            0 => strong.iter().take(3).collect(),
            1 => near,
            _ => near.into_iter().take(2).collect(),
        };

        let mut categories = keep_most_specific(
            sources
                .iter()
                .flat_map(|c| c.product.category.iter().cloned())
                .collect(),
        );
        categories.truncate(p.max_extracted_categories);
        let mut soft = dedup_preserving(
            sources
                .iter()
                .flat_map(|c| c.product.soft_category.iter().cloned()),
        );
        soft.truncate(p.max_extracted_categories);

        debug!(?categories, ?soft, "derived categories");
        cx.derived_categories = categories;
        cx.derived_soft = soft;
    }
}
