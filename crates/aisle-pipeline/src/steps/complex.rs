//! Complex queries: concurrent text + vector retrieval, fusion, and an AI
//! rerank of the head of the list.

use aisle_core::models::{Candidate, RerankCandidate, RerankRequest, TierTag};
use aisle_observability::ai_span;
use aisle_scoring::fusion::soft_matches_first;
use tracing::{debug, Instrument};

use crate::gate;
use crate::orchestrator::PipelineOrchestrator;
use crate::rerank::apply_rerank;
use crate::state::{PipelineState, RequestContext};

impl PipelineOrchestrator {
    pub(crate) async fn complex_rerank(&self, cx: &mut RequestContext) -> PipelineState {
        let limit = self.config.pipeline.complex_fusion_limit;
        let hybrid = self
            .retriever
            .hybrid(
                &cx.query,
                &cx.filters.hard,
                &cx.filters.soft,
                limit,
                &cx.exclude,
                &mut cx.tracker,
            )
            .await;
        let hybrid = match hybrid {
            Ok(hybrid) => hybrid,
            Err(e) => {
                cx.fail_retrieval("hybrid_search", "empty", e);
                return self.after_path(cx);
            }
        };
        if cx.embedding.is_none() {
            cx.embedding = hybrid.embedding;
        }

        let mut fused = self.fusion.fuse(
            hybrid.text,
            hybrid.vector,
            &cx.query,
            &cx.filters.soft,
            &self.weights(cx),
            TierTag::TextMatch,
        );
        for c in fused.iter_mut().filter(|c| c.text_rank.is_none()) {
            c.tier = TierTag::CategoryExpansion;
        }
        fused.retain(|c| gate::passes(&c.product, &cx.filters.hard, &cx.query));
        self.rank(cx, &mut fused, &cx.filters.soft);

        cx.candidates = if cx.is_load_more() {
            soft_matches_first(fused)
        } else {
            self.rerank(cx, fused).await
        };
        self.after_path(cx)
    }

    /// Rerank the first `rerank_input_cap` candidates. On any failure the
    /// fused order stands and no explanations are attached.
    async fn rerank(&self, cx: &mut RequestContext, mut fused: Vec<Candidate>) -> Vec<Candidate> {
        if fused.is_empty() {
            return fused;
        }
        let p = &self.config.pipeline;
        let context = cx.query_context(false);

        let (verdict, fallback) = self.classifier.specificity(&cx.query, &context).await;
        if let Some(reason) = fallback {
            cx.tracker.note("classify_specificity", "broad", reason);
        }
        let max_results = verdict.max_results.clamp(1, p.rerank_max_results);

        let offered = fused.len().min(p.rerank_input_cap);
        let request = RerankRequest {
            query: cx.query.clone(),
            context,
            candidates: fused
                .iter()
                .take(offered)
                .map(|c| RerankCandidate::from(&c.product))
                .collect(),
            soft_filters: cx.filters.soft.clone(),
            max_results,
            explain: cx.store.explain,
        };

        let reranker = self.reranker.as_ref();
        let result = self
            .gateway
            .call("rerank", || reranker.rerank(&request))
            .instrument(ai_span!("rerank"))
            .await;

        match result {
            Ok(items) => {
                debug!(offered, returned = items.len(), max_results, "reranked");
                apply_rerank(fused, items, offered, max_results)
            }
            Err(e) => {
                cx.tracker.note("rerank", "rrf_order", e.to_string());
                for c in &mut fused {
                    c.explanation = None;
                }
                fused
            }
        }
    }
}
