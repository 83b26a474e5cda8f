//! Pipeline states and the per-request context threaded through them.

use std::collections::HashSet;

use aisle_core::errors::RetrievalError;
use aisle_core::models::{
    Candidate, ExtractedFilters, HardFilters, PipelinePath, Product, ProductId, QueryContext,
    RejectedTerm, SessionState, StoreContext, UserProfile,
};
use aisle_observability::DegradationTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    FilterOnlyFast,
    TwoStepTier1,
    TwoStepTier2,
    ComplexRerank,
    EmergencyExpansion,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilterOnlyFast => "filter_only_fast",
            Self::TwoStepTier1 => "two_step_tier1",
            Self::TwoStepTier2 => "two_step_tier2",
            Self::ComplexRerank => "complex_rerank",
            Self::EmergencyExpansion => "emergency_expansion",
            Self::Done => "done",
        }
    }

    /// The state a recorded path resumes in on load-more.
    pub fn resume(path: PipelinePath) -> Self {
        match path {
            PipelinePath::FilterOnlyFast => Self::FilterOnlyFast,
            PipelinePath::TwoStep => Self::TwoStepTier1,
            PipelinePath::Complex => Self::ComplexRerank,
            PipelinePath::ZeroResultFallback => Self::Done,
        }
    }
}

/// Mutable state of one request. Steps read the query and filters, append
/// candidates, and record every fallback on `tracker`.
#[derive(Debug)]
pub(crate) struct RequestContext {
    pub query: String,
    pub store: StoreContext,
    pub page_size: usize,
    pub filters: ExtractedFilters,
    pub rejected: Vec<RejectedTerm>,
    /// Ids that must not appear again (delivered on earlier pages).
    pub exclude: HashSet<ProductId>,
    pub path: PipelinePath,
    pub candidates: Vec<Candidate>,
    pub already_ordered: bool,
    /// Text hits from the preliminary search and the hard filters they were fetched with.
    pub preliminary: Option<(HardFilters, Vec<Product>)>,
    pub embedding: Option<Vec<f32>>,
    /// Hard categories derived from the strongest Tier 1 hits.
    pub derived_categories: Vec<String>,
    /// Soft categories of the strongest Tier 1 hits.
    pub derived_soft: Vec<String>,
    pub profile: Option<UserProfile>,
    pub tracker: DegradationTracker,
    pub emergency_done: bool,
    /// Last total retrieval failure, surfaced if nothing else produced results.
    pub retrieval_failure: Option<RetrievalError>,
    /// Set on load-more.
    pub session: Option<SessionState>,
}

impl RequestContext {
    pub fn new(query: String, store: StoreContext, page_size: usize) -> Self {
        Self {
            query,
            store,
            page_size: page_size.max(1),
            filters: ExtractedFilters::default(),
            rejected: Vec::new(),
            exclude: HashSet::new(),
            path: PipelinePath::TwoStep,
            candidates: Vec::new(),
            already_ordered: false,
            preliminary: None,
            embedding: None,
            derived_categories: Vec::new(),
            derived_soft: Vec::new(),
            profile: None,
            tracker: DegradationTracker::new(),
            emergency_done: false,
            retrieval_failure: None,
            session: None,
        }
    }

    pub fn is_load_more(&self) -> bool {
        self.session.is_some()
    }

    pub fn query_context(&self, prior_text_match: bool) -> QueryContext {
        QueryContext {
            store_id: self.store.store_id.clone(),
            store_description: self.store.description.clone(),
            prior_text_match,
        }
    }

    /// Ids already in the candidate list plus the excluded ones.
    pub fn seen_ids(&self) -> HashSet<ProductId> {
        let mut seen = self.exclude.clone();
        seen.extend(self.candidates.iter().map(|c| c.product.id.clone()));
        seen
    }

    pub fn fail_retrieval(&mut self, component: &str, fallback: &str, error: RetrievalError) {
        self.tracker.note(component, fallback, error.to_string());
        self.retrieval_failure = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_resumes_somewhere() {
        assert_eq!(
            PipelineState::resume(PipelinePath::TwoStep),
            PipelineState::TwoStepTier1
        );
        assert_eq!(
            PipelineState::resume(PipelinePath::Complex),
            PipelineState::ComplexRerank
        );
        assert_eq!(
            PipelineState::resume(PipelinePath::FilterOnlyFast),
            PipelineState::FilterOnlyFast
        );
    }

    #[test]
    fn page_size_is_at_least_one() {
        let cx = RequestContext::new("x".into(), StoreContext::default(), 0);
        assert_eq!(cx.page_size, 1);
        assert!(!cx.is_load_more());
    }
}
