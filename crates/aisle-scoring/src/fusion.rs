//! Reciprocal Rank Fusion with exact-match and soft-category boosting.
//!
//! `final = Σ 1/(k + rank) + soft boost + color boost + exact bonus + multi-category boost`
//!
//! Ordering is a strict contract: very strong text matches first, then soft
//! matches (when soft filters were requested), then multi-category matches,
//! then final score.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use aisle_core::config::ScoringConfig;
use aisle_core::models::{Candidate, Product, SoftFilters, TierTag};
use aisle_core::text::normalize_category;

use crate::colors::expand_similar_colors;
use crate::exact_match::{ExactMatchScorer, PreparedQuery};

/// Per-category weights for the soft-category weighted score. Categories not
/// in the map get `default_weight`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostWeights {
    weights: HashMap<String, f64>,
    default_weight: f64,
}

impl BoostWeights {
    pub fn uniform(default_weight: f64) -> Self {
        Self {
            weights: HashMap::new(),
            default_weight,
        }
    }

    /// Weights that rank the shopper's own words above categories derived
    /// from matched products. A category in both lists keeps the query weight.
    pub fn query_over_derived(
        query_categories: &[String],
        derived_categories: &[String],
        config: &ScoringConfig,
    ) -> Self {
        let mut weights = HashMap::new();
        for c in derived_categories {
            weights.insert(normalize_category(c), config.derived_category_weight);
        }
        for c in query_categories {
            weights.insert(normalize_category(c), config.query_category_weight);
        }
        Self {
            weights,
            default_weight: config.unweighted_category_weight,
        }
    }

    pub fn weight(&self, category: &str) -> f64 {
        self.weights
            .get(&normalize_category(category))
            .copied()
            .unwrap_or(self.default_weight)
    }
}

/// Soft filters normalized once per request.
#[derive(Debug, Clone, Default)]
pub struct PreparedSoft {
    categories: Vec<String>,
    colors: BTreeSet<String>,
}

impl PreparedSoft {
    pub fn new(soft: &SoftFilters) -> Self {
        Self {
            categories: soft.soft_category.iter().map(|c| normalize_category(c)).collect(),
            colors: expand_similar_colors(&soft.color),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.colors.is_empty()
    }
}

/// Stateless fusion engine parameterised by scoring config.
#[derive(Debug, Clone)]
pub struct ScoreFusion {
    config: ScoringConfig,
    scorer: ExactMatchScorer,
}

impl Default for ScoreFusion {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ScoreFusion {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            scorer: ExactMatchScorer::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn scorer(&self) -> &ExactMatchScorer {
        &self.scorer
    }

    /// Fuse a text ranking and a vector ranking (both best-first) into one
    /// sorted candidate list keyed by product id.
    pub fn fuse(
        &self,
        text_ranked: Vec<Product>,
        vector_ranked: Vec<Product>,
        query: &str,
        soft: &SoftFilters,
        weights: &BoostWeights,
        tier: TierTag,
    ) -> Vec<Candidate> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for (rank, product) in text_ranked.into_iter().enumerate() {
            let slot = *index.entry(product.id.clone()).or_insert_with(|| {
                candidates.push(Candidate::new(product, tier));
                candidates.len() - 1
            });
            let c = &mut candidates[slot];
            c.text_rank = Some(c.text_rank.map_or(rank, |r| r.min(rank)));
        }
        for (rank, product) in vector_ranked.into_iter().enumerate() {
            let slot = *index.entry(product.id.clone()).or_insert_with(|| {
                candidates.push(Candidate::new(product, tier));
                candidates.len() - 1
            });
            let c = &mut candidates[slot];
            c.vector_rank = Some(c.vector_rank.map_or(rank, |r| r.min(rank)));
        }

        let prepared_query = PreparedQuery::new(query);
        let prepared_soft = PreparedSoft::new(soft);
        for c in &mut candidates {
            c.rrf_score = self.rrf(c.text_rank, c.vector_rank);
            c.exact_match_bonus = self.scorer.bonus_prepared(&c.product.name, &prepared_query);
            self.apply_soft_signals(c, &prepared_soft, weights);
            self.recompute_final(c);
        }

        self.sort(&mut candidates, !prepared_soft.is_empty());
        tracing::debug!(
            candidates = candidates.len(),
            soft_requested = !prepared_soft.is_empty(),
            "fused rankings"
        );
        candidates
    }

    /// `Σ 1/(k + rank)` over the sources that returned the product.
    pub fn rrf(&self, text_rank: Option<usize>, vector_rank: Option<usize>) -> f64 {
        let k = self.config.rrf_k as f64;
        [text_rank, vector_rank]
            .into_iter()
            .flatten()
            .map(|r| 1.0 / (k + r as f64))
            .sum()
    }

    /// `weighted ≥ threshold → weighted × linear_factor`, otherwise
    /// `base^weighted × exp_factor`, and 0 with no overlap.
    pub fn multi_category_boost(&self, weighted_score: f64) -> f64 {
        let c = &self.config;
        if weighted_score >= c.multi_category_linear_threshold {
            weighted_score * c.multi_category_linear_factor
        } else if weighted_score > 0.0 {
            c.multi_category_exp_base.powf(weighted_score) * c.multi_category_exp_factor
        } else {
            0.0
        }
    }

    /// Record soft-category overlap and color match on `candidate`.
    pub fn apply_soft_signals(
        &self,
        candidate: &mut Candidate,
        soft: &PreparedSoft,
        weights: &BoostWeights,
    ) {
        let product_soft: Vec<String> = candidate
            .product
            .soft_category
            .iter()
            .map(|c| normalize_category(c))
            .collect();
        let matched: Vec<&String> = soft
            .categories
            .iter()
            .filter(|c| product_soft.contains(c))
            .collect();
        candidate.soft_category_match_count = matched.len() as u32;
        candidate.soft_category_weighted_score = matched.iter().map(|c| weights.weight(c)).sum();
        candidate.color_match = !soft.colors.is_empty()
            && candidate
                .product
                .colors
                .iter()
                .any(|c| soft.colors.contains(&normalize_category(c)));
    }

    /// Recompute `final_score` from the signals already on the candidate.
    pub fn recompute_final(&self, candidate: &mut Candidate) {
        let c = &self.config;
        let soft = candidate.soft_category_match_count as f64 * c.soft_match_boost;
        let color = if candidate.color_match { c.color_boost } else { 0.0 };
        candidate.final_score = candidate.rrf_score
            + soft
            + color
            + candidate.exact_match_bonus as f64
            + self.multi_category_boost(candidate.soft_category_weighted_score);
    }

    /// Score soft signals on already-retrieved candidates and recompute final scores.
    pub fn boost_soft(&self, candidates: &mut [Candidate], soft: &SoftFilters, weights: &BoostWeights) {
        let prepared = PreparedSoft::new(soft);
        for c in candidates.iter_mut() {
            self.apply_soft_signals(c, &prepared, weights);
            self.recompute_final(c);
        }
    }

    /// Strict ranking comparator.
    pub fn compare(&self, a: &Candidate, b: &Candidate, soft_requested: bool) -> Ordering {
        let strong = self.config.very_strong_match;
        let a_strong = a.exact_match_bonus >= strong;
        let b_strong = b.exact_match_bonus >= strong;
        b_strong
            .cmp(&a_strong)
            .then_with(|| {
                if soft_requested {
                    b.has_soft_match().cmp(&a.has_soft_match())
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| {
                (b.soft_category_match_count >= 2).cmp(&(a.soft_category_match_count >= 2))
            })
            .then_with(|| b.final_score.total_cmp(&a.final_score))
            .then_with(|| b.profile_boost.total_cmp(&a.profile_boost))
            .then_with(|| a.product.id.cmp(&b.product.id))
    }

    pub fn sort(&self, candidates: &mut [Candidate], soft_requested: bool) {
        candidates.sort_by(|a, b| self.compare(a, b, soft_requested));
    }
}

/// Stable partition moving soft-filter matches ahead of the rest.
pub fn soft_matches_first(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let (mut matched, rest): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(Candidate::has_soft_match);
    matched.extend(rest);
    matched
}
