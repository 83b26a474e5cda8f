use aisle_core::models::{Candidate, TierTag};
use aisle_scoring::fusion::soft_matches_first;
use aisle_scoring::profile_boost;

use crate::orchestrator::PipelineOrchestrator;
use crate::state::{PipelineState, RequestContext};

impl PipelineOrchestrator {
    /// Structured query over the extracted filters, cheapest first. Soft
    /// matches float to the top without excluding anything.
    pub(crate) async fn filter_only_fast(&self, cx: &mut RequestContext) -> PipelineState {
        let limit = self.config.pipeline.filter_only_limit;
        let result = self
            .retriever
            .filter_only(&cx.filters.hard, &cx.filters.soft, limit, &cx.exclude)
            .await;

        match result {
            Ok(products) => {
                let mut candidates: Vec<Candidate> = products
                    .into_iter()
                    .map(|p| Candidate::new(p, TierTag::FilterOnly))
                    .collect();
                self.fusion
                    .boost_soft(&mut candidates, &cx.filters.soft, &self.weights(cx));
                if let Some(profile) = &cx.profile {
                    profile_boost::apply(
                        &mut candidates,
                        profile,
                        self.fusion.config().profile_boost_weight,
                    );
                }
                candidates.sort_by(|a, b| {
                    a.product
                        .price
                        .total_cmp(&b.product.price)
                        .then_with(|| b.profile_boost.total_cmp(&a.profile_boost))
                        .then_with(|| a.id().cmp(b.id()))
                });
                cx.candidates = if cx.filters.soft.is_empty() {
                    candidates
                } else {
                    soft_matches_first(candidates)
                };
            }
            Err(e) => cx.fail_retrieval("filter_only", "empty", e),
        }
        self.after_path(cx)
    }
}
