use serde::{Deserialize, Serialize};

use super::defaults;

/// Pipeline orchestration limits and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Page size when the store does not configure one.
    pub default_page_size: usize,
    /// Minimum exact-match bonus for a Tier 1 result to be kept.
    pub high_quality_threshold: u32,
    /// Bonus at which a Tier 1 result counts toward skipping Tier 2.
    pub excellent_threshold: u32,
    /// Bonus at which a Tier 1 result is a near-perfect match.
    pub near_perfect_threshold: u32,
    pub tier1_limit: usize,
    pub tier2_limit: usize,
    /// Hard cap on any vector search candidate pool.
    pub vector_pool_cap: usize,
    /// Raw query tokens forwarded to fuzzy text search.
    pub max_fuzzy_tokens: usize,
    pub rerank_input_cap: usize,
    pub rerank_max_results: usize,
    pub weak_match_cap: usize,
    pub select_relevant_cap: usize,
    /// Below this many results (with a hard category) emergency expansion runs.
    pub emergency_min_results: usize,
    pub emergency_vector_cap: usize,
    pub emergency_rerank_cap: usize,
    /// Share of meaningful query tokens the extracted filters must explain
    /// before the filter-only fast path is taken.
    pub filter_only_coverage: f64,
    pub filter_only_limit: usize,
    pub complex_fusion_limit: usize,
    pub recommendation_count: usize,
    /// Relative price band for unique-product recommendations.
    pub recommendation_price_band: f64,
    pub max_extracted_categories: usize,
    pub sweep_cap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_page_size: defaults::DEFAULT_PAGE_SIZE,
            high_quality_threshold: defaults::DEFAULT_HIGH_QUALITY_THRESHOLD,
            excellent_threshold: defaults::DEFAULT_EXCELLENT_THRESHOLD,
            near_perfect_threshold: defaults::DEFAULT_NEAR_PERFECT_THRESHOLD,
            tier1_limit: defaults::DEFAULT_TIER1_LIMIT,
            tier2_limit: defaults::DEFAULT_TIER2_LIMIT,
            vector_pool_cap: defaults::DEFAULT_VECTOR_POOL_CAP,
            max_fuzzy_tokens: defaults::DEFAULT_MAX_FUZZY_TOKENS,
            rerank_input_cap: defaults::DEFAULT_RERANK_INPUT_CAP,
            rerank_max_results: defaults::DEFAULT_RERANK_MAX_RESULTS,
            weak_match_cap: defaults::DEFAULT_WEAK_MATCH_CAP,
            select_relevant_cap: defaults::DEFAULT_SELECT_RELEVANT_CAP,
            emergency_min_results: defaults::DEFAULT_EMERGENCY_MIN_RESULTS,
            emergency_vector_cap: defaults::DEFAULT_EMERGENCY_VECTOR_CAP,
            emergency_rerank_cap: defaults::DEFAULT_EMERGENCY_RERANK_CAP,
            filter_only_coverage: defaults::DEFAULT_FILTER_ONLY_COVERAGE,
            filter_only_limit: defaults::DEFAULT_FILTER_ONLY_LIMIT,
            complex_fusion_limit: defaults::DEFAULT_COMPLEX_FUSION_LIMIT,
            recommendation_count: defaults::DEFAULT_RECOMMENDATION_COUNT,
            recommendation_price_band: defaults::DEFAULT_RECOMMENDATION_PRICE_BAND,
            max_extracted_categories: defaults::DEFAULT_MAX_EXTRACTED_CATEGORIES,
            sweep_cap: defaults::DEFAULT_SWEEP_CAP,
        }
    }
}
