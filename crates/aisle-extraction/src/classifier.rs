//! Simple/complex routing decision.

use std::sync::Arc;
use std::time::Duration;

use aisle_core::models::{Complexity, DecisionSource, QueryContext, SpecificityVerdict};
use aisle_core::text::normalize_text;
use aisle_core::traits::{ClassifierService, LearnedOverrideStore};
use aisle_observability::events;
use aisle_resilience::{Cache, ResilientGateway};
use tracing::{debug, warn};

use crate::rules::RuleBasedClassifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub complexity: Complexity,
    pub source: DecisionSource,
    /// Set when the rule-based fallback answered instead of the AI.
    pub fallback_reason: Option<String>,
}

impl Classification {
    fn decided(complexity: Complexity, source: DecisionSource) -> Self {
        Self {
            complexity,
            source,
            fallback_reason: None,
        }
    }
}

/// Decides whether a query is simple, consulting in order: learned
/// overrides, a prior high-confidence text match, and then the AI classifier
/// or, when the gateway is open or the call fails, the rule-based one.
pub struct QueryClassifier {
    ai: Arc<dyn ClassifierService>,
    rules: RuleBasedClassifier,
    overrides: Option<Arc<dyn LearnedOverrideStore>>,
    gateway: ResilientGateway,
    cache: Cache,
    ttl: Duration,
}

impl QueryClassifier {
    pub fn new(
        ai: Arc<dyn ClassifierService>,
        gateway: ResilientGateway,
        cache: Cache,
        ttl: Duration,
    ) -> Self {
        Self {
            ai,
            rules: RuleBasedClassifier::new(),
            overrides: None,
            gateway,
            cache,
            ttl,
        }
    }

    pub fn with_overrides(mut self, overrides: Arc<dyn LearnedOverrideStore>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// The strategy to consult: AI while the gateway admits calls, rules
    /// otherwise.
    fn strategy(&self, operation: &str) -> Option<&dyn ClassifierService> {
        match self.gateway.open_breaker() {
            Some(open) => {
                events::circuit_short_circuited(open.name(), operation);
                None
            }
            None => Some(self.ai.as_ref()),
        }
    }

    pub async fn classify(&self, query: &str, context: &QueryContext) -> Classification {
        if let Some(store) = &self.overrides {
            match store.lookup(query).await {
                Ok(Some(complexity)) => {
                    debug!(query, ?complexity, "learned override");
                    return Classification::decided(complexity, DecisionSource::LearnedOverride);
                }
                Ok(None) => {}
                Err(e) => warn!(query, error = %e, "override lookup failed"),
            }
        }

        if context.prior_text_match {
            return Classification::decided(Complexity::Simple, DecisionSource::PriorTextMatch);
        }

        let fallback = |reason: String| Classification {
            complexity: self.rules.complexity(query),
            source: DecisionSource::Fallback,
            fallback_reason: Some(reason),
        };

        let Some(ai) = self.strategy("classify_complexity") else {
            return fallback("circuit open".to_string());
        };

        let key = (normalize_text(query), context.store_id.as_str());
        let result = self
            .cache
            .with_cache("classify_complexity", &key, self.ttl, || {
                self.gateway
                    .call("classify_complexity", || ai.classify_complexity(query, context))
            })
            .await;

        match result {
            Ok(complexity) => Classification::decided(complexity, DecisionSource::Ai),
            Err(e) => fallback(e.to_string()),
        }
    }

    /// How narrow the query is; broad with the default result count when the
    /// AI cannot answer. The second value carries the fallback reason.
    pub async fn specificity(
        &self,
        query: &str,
        context: &QueryContext,
    ) -> (SpecificityVerdict, Option<String>) {
        let Some(ai) = self.strategy("classify_specificity") else {
            return (self.rules.specificity(), Some("circuit open".to_string()));
        };

        let key = (normalize_text(query), context.store_id.as_str());
        let result = self
            .cache
            .with_cache("classify_specificity", &key, self.ttl, || {
                self.gateway
                    .call("classify_specificity", || ai.classify_specificity(query, context))
            })
            .await;

        match result {
            Ok(verdict) => (verdict, None),
            Err(e) => (self.rules.specificity(), Some(e.to_string())),
        }
    }
}

impl std::fmt::Debug for QueryClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClassifier")
            .field("has_overrides", &self.overrides.is_some())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
