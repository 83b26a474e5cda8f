//! Free text to validated hard and soft filters.

use std::sync::Arc;
use std::time::Duration;

use aisle_core::models::{
    CatalogVocabulary, DecisionSource, ExtractedFilters, QueryContext, RawExtraction,
    RejectedTerm,
};
use aisle_core::text::normalize_text;
use aisle_core::traits::FilterExtractionService;
use aisle_observability::events;
use aisle_resilience::{Cache, ResilientGateway};
use tracing::debug;

use crate::rules::{RuleBasedExtractor, RuleExtraction};
use crate::validation::VocabularyValidator;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub filters: ExtractedFilters,
    /// Extracted values with no vocabulary match.
    pub rejected: Vec<RejectedTerm>,
    pub source: DecisionSource,
    pub fallback_reason: Option<String>,
    /// The rule-based reading, kept for coverage checks.
    pub rules: RuleExtraction,
}

impl Extraction {
    /// Share of meaningful query tokens the rule-based reading explains.
    pub fn coverage(&self) -> f64 {
        self.rules.coverage()
    }
}

fn merge(mut ai: RawExtraction, rules: &RawExtraction) -> RawExtraction {
    ai.category.extend(rules.category.iter().cloned());
    ai.product_type.extend(rules.product_type.iter().cloned());
    ai.soft_category.extend(rules.soft_category.iter().cloned());
    ai.color.extend(rules.color.iter().cloned());
    if ai.price.is_none() && ai.min_price.is_none() && ai.max_price.is_none() {
        ai.price = rules.price;
        ai.min_price = rules.min_price;
        ai.max_price = rules.max_price;
    }
    ai
}

/// AI extraction augmented with exact vocabulary phrase hits and rule-based
/// prices; rules alone when the gateway is open or the AI call fails.
pub struct FilterExtractor {
    ai: Arc<dyn FilterExtractionService>,
    rules: RuleBasedExtractor,
    gateway: ResilientGateway,
    cache: Cache,
    ttl: Duration,
}

impl FilterExtractor {
    pub fn new(
        ai: Arc<dyn FilterExtractionService>,
        gateway: ResilientGateway,
        cache: Cache,
        ttl: Duration,
    ) -> Self {
        Self {
            ai,
            rules: RuleBasedExtractor::new(),
            gateway,
            cache,
            ttl,
        }
    }

    /// Rule-based extraction only, validated. Makes no AI call.
    pub fn extract_rules(&self, query: &str, vocabulary: &CatalogVocabulary) -> Extraction {
        let rules = self.rules.analyze(query, vocabulary);
        let (filters, rejected) = VocabularyValidator::new(vocabulary).validate(&rules.raw);
        Extraction {
            filters,
            rejected,
            source: DecisionSource::Fallback,
            fallback_reason: None,
            rules,
        }
    }

    pub async fn extract(
        &self,
        query: &str,
        vocabulary: &CatalogVocabulary,
        context: &QueryContext,
    ) -> Extraction {
        let rules = self.rules.analyze(query, vocabulary);

        let (raw, source, fallback_reason) = if let Some(open) = self.gateway.open_breaker() {
            events::circuit_short_circuited(open.name(), "extract_filters");
            (rules.raw.clone(), DecisionSource::Fallback, Some("circuit open".to_string()))
        } else {
            let key = (normalize_text(query), context.store_id.as_str(), vocabulary);
            let ai = self.ai.as_ref();
            let result = self
                .cache
                .with_cache("extract_filters", &key, self.ttl, || {
                    self.gateway
                        .call("extract_filters", || ai.extract(query, vocabulary, context))
                })
                .await;
            match result {
                Ok(extracted) => (merge(extracted, &rules.raw), DecisionSource::Ai, None),
                Err(e) => (rules.raw.clone(), DecisionSource::Fallback, Some(e.to_string())),
            }
        };

        let (filters, rejected) = VocabularyValidator::new(vocabulary).validate(&raw);
        if !rejected.is_empty() {
            debug!(query, rejected = rejected.len(), "extracted values outside vocabulary");
        }
        Extraction {
            filters,
            rejected,
            source,
            fallback_reason,
            rules,
        }
    }
}

impl std::fmt::Debug for FilterExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterExtractor")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
