use aisle_core::models::{
    Candidate, DegradationEvent, ExtractedFilters, PipelinePath, RejectedTerm, StoreContext,
};
use serde::Serialize;

/// A first-page search.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub store: StoreContext,
    /// Shopper session used to look up a profile for secondary ranking.
    pub profile_session_id: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, store: StoreContext) -> Self {
        Self {
            query: query.into(),
            store,
            profile_session_id: None,
        }
    }

    pub fn with_profile(mut self, session_id: impl Into<String>) -> Self {
        self.profile_session_id = Some(session_id.into());
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<Candidate>,
    pub path: PipelinePath,
    /// Filters the results were gated on.
    pub filters: ExtractedFilters,
    /// Present when more results exist; pass to `load_more`.
    pub continuation_token: Option<String>,
    pub batch_number: u32,
    pub has_more: bool,
    pub rejected_terms: Vec<RejectedTerm>,
    pub degradations: Vec<DegradationEvent>,
    /// The order was decided by a bounded AI selection and must not be re-sorted.
    pub already_ordered: bool,
}

impl SearchPage {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.product.id.as_str()).collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn degraded(&self, component: &str) -> bool {
        self.degradations.iter().any(|d| d.component == component)
    }
}
