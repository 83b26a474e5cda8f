//! Records every fallback taken while serving one request.

use aisle_core::models::DegradationEvent;

/// Collects degradation events for one request and logs each as it happens.
#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    events: Vec<DegradationEvent>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DegradationEvent) {
        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.fallback,
            &event.reason,
        );
        self.events.push(event);
    }

    /// Shorthand for `record(DegradationEvent::new(..))`.
    pub fn note(&mut self, component: &str, fallback: &str, reason: impl Into<String>) {
        self.record(DegradationEvent::new(component, fallback, reason));
    }

    pub fn events(&self) -> &[DegradationEvent] {
        &self.events
    }

    pub fn has(&self, component: &str) -> bool {
        self.events.iter().any(|e| e.component == component)
    }

    pub fn into_events(self) -> Vec<DegradationEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut t = DegradationTracker::new();
        t.note("rerank", "rrf_order", "timeout");
        t.note("text_search", "vector_only", "index offline");
        assert_eq!(t.events().len(), 2);
        assert!(t.has("rerank"));
        assert!(!t.has("classify"));
        assert_eq!(t.into_events()[1].fallback, "vector_only");
    }
}
