use serde::{Deserialize, Serialize};

/// A fallback taken while serving one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationEvent {
    /// Component that degraded, e.g. `rerank` or `text_search`.
    pub component: String,
    /// What was used instead.
    pub fallback: String,
    pub reason: String,
}

impl DegradationEvent {
    pub fn new(
        component: impl Into<String>,
        fallback: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            fallback: fallback.into(),
            reason: reason.into(),
        }
    }
}
