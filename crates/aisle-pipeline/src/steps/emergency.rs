use aisle_core::models::{RerankCandidate, TierTag};
use aisle_observability::ai_span;
use tracing::{info, Instrument};

use crate::gate;
use crate::orchestrator::PipelineOrchestrator;
use crate::rerank::promote_selected;
use crate::state::{PipelineState, RequestContext};

impl PipelineOrchestrator {
    /// Too few results inside a hard category: pull more from the vector
    /// index within that category, then let a fast bounded selection order
    /// the merged batch. Runs at most once per request.
    pub(crate) async fn emergency_expansion(&self, cx: &mut RequestContext) -> PipelineState {
        cx.emergency_done = true;
        let p = &self.config.pipeline;
        info!(
            event = "emergency_expansion",
            found = cx.candidates.len(),
            categories = ?cx.filters.hard.category,
            "too few results, expanding"
        );

        let Some(embedding) = self.ensure_embedding(cx).await else {
            return PipelineState::Done;
        };
        let exclude = cx.seen_ids();
        let result = self
            .retriever
            .vector_search(
                &embedding,
                &cx.filters.hard,
                p.emergency_vector_cap,
                &exclude,
                Some(&cx.filters.soft),
                false,
            )
            .await;

        match result {
            Ok(products) => {
                let mut extra = self.fusion.fuse(
                    Vec::new(),
                    products,
                    &cx.query,
                    &cx.filters.soft,
                    &self.weights(cx),
                    TierTag::CategoryExpansion,
                );
                extra.retain(|c| gate::passes(&c.product, &cx.filters.hard, &cx.query));
                cx.candidates.extend(extra);
            }
            Err(e) => {
                cx.tracker.note("emergency_vector_search", "current_results", e.to_string());
                return PipelineState::Done;
            }
        }
        if cx.candidates.is_empty() {
            return PipelineState::Done;
        }

        let pool: Vec<RerankCandidate> = cx
            .candidates
            .iter()
            .take(p.select_relevant_cap)
            .map(|c| RerankCandidate::from(&c.product))
            .collect();
        let max = p.emergency_rerank_cap;
        let validator = self.validator.as_ref();
        let query = cx.query.as_str();
        let result = self
            .gateway
            .call("select_relevant", || validator.select_relevant(&pool, query, max))
            .instrument(ai_span!("select_relevant"))
            .await;

        match result {
            Ok(selected) => {
                cx.candidates = promote_selected(std::mem::take(&mut cx.candidates), &selected, max);
            }
            Err(e) => cx.tracker.note("select_relevant", "merge_order", e.to_string()),
        }
        cx.already_ordered = true;
        PipelineState::Done
    }
}
