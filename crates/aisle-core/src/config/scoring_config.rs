use serde::{Deserialize, Serialize};

use super::defaults;

/// Text-match tiers and fusion boosts.
///
/// Every scoring constant lives here so a store can tune them without code
/// changes. Tier bonuses are evaluated in a fixed order by the text matcher;
/// see `aisle_scoring::exact_match`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// RRF k-value for rank fusion.
    pub rrf_k: u32,
    /// Boost added per overlapping soft category.
    pub soft_match_boost: f64,
    /// Boost added when any product color matches a requested color (or shade).
    pub color_boost: f64,
    /// Weighted score at which the multi-category boost switches to linear.
    pub multi_category_linear_threshold: f64,
    pub multi_category_linear_factor: f64,
    pub multi_category_exp_base: f64,
    pub multi_category_exp_factor: f64,
    /// Weight of a soft category extracted from the query itself.
    pub query_category_weight: f64,
    /// Weight of a category derived from already-matched products.
    pub derived_category_weight: f64,
    /// Weight of a soft category with no explicit weight.
    pub unweighted_category_weight: f64,
    /// Bonus at or above which a text match is "very strong" and always sorts first.
    pub very_strong_match: u32,
    /// Multiplier applied to the profile boost.
    pub profile_boost_weight: f64,

    pub exact_equality_bonus: u32,
    pub phrase_start_bonus: u32,
    pub stemmed_equality_bonus: u32,
    pub phrase_anywhere_bonus: u32,
    pub substring_start_bonus: u32,
    pub substring_anywhere_bonus: u32,
    pub stemmed_token_all_bonus: u32,
    pub stemmed_token_first_bonus: u32,
    pub stemmed_token_bonus: u32,
    pub prefix_first_bonus: u32,
    pub prefix_early_bonus: u32,
    pub word_coverage_bonus: u32,
    pub word_coverage_ratio: f64,
    pub fuzzy_bonus_min: u32,
    pub fuzzy_bonus_max: u32,
    pub fuzzy_threshold: f64,
    /// Characters considered by the edit-distance routine per input.
    pub levenshtein_cap: usize,
    /// Name-token positions (0-based, inclusive) that count as "early".
    pub early_position_window: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            soft_match_boost: defaults::DEFAULT_SOFT_MATCH_BOOST,
            color_boost: defaults::DEFAULT_COLOR_BOOST,
            multi_category_linear_threshold: defaults::DEFAULT_MULTI_CATEGORY_LINEAR_THRESHOLD,
            multi_category_linear_factor: defaults::DEFAULT_MULTI_CATEGORY_LINEAR_FACTOR,
            multi_category_exp_base: defaults::DEFAULT_MULTI_CATEGORY_EXP_BASE,
            multi_category_exp_factor: defaults::DEFAULT_MULTI_CATEGORY_EXP_FACTOR,
            query_category_weight: defaults::DEFAULT_QUERY_CATEGORY_WEIGHT,
            derived_category_weight: defaults::DEFAULT_DERIVED_CATEGORY_WEIGHT,
            unweighted_category_weight: defaults::DEFAULT_UNWEIGHTED_CATEGORY_WEIGHT,
            very_strong_match: defaults::DEFAULT_VERY_STRONG_MATCH,
            profile_boost_weight: defaults::DEFAULT_PROFILE_BOOST_WEIGHT,
            exact_equality_bonus: defaults::DEFAULT_EXACT_EQUALITY_BONUS,
            phrase_start_bonus: defaults::DEFAULT_PHRASE_START_BONUS,
            stemmed_equality_bonus: defaults::DEFAULT_STEMMED_EQUALITY_BONUS,
            phrase_anywhere_bonus: defaults::DEFAULT_PHRASE_ANYWHERE_BONUS,
            substring_start_bonus: defaults::DEFAULT_SUBSTRING_START_BONUS,
            substring_anywhere_bonus: defaults::DEFAULT_SUBSTRING_ANYWHERE_BONUS,
            stemmed_token_all_bonus: defaults::DEFAULT_STEMMED_TOKEN_ALL_BONUS,
            stemmed_token_first_bonus: defaults::DEFAULT_STEMMED_TOKEN_FIRST_BONUS,
            stemmed_token_bonus: defaults::DEFAULT_STEMMED_TOKEN_BONUS,
            prefix_first_bonus: defaults::DEFAULT_PREFIX_FIRST_BONUS,
            prefix_early_bonus: defaults::DEFAULT_PREFIX_EARLY_BONUS,
            word_coverage_bonus: defaults::DEFAULT_WORD_COVERAGE_BONUS,
            word_coverage_ratio: defaults::DEFAULT_WORD_COVERAGE_RATIO,
            fuzzy_bonus_min: defaults::DEFAULT_FUZZY_BONUS_MIN,
            fuzzy_bonus_max: defaults::DEFAULT_FUZZY_BONUS_MAX,
            fuzzy_threshold: defaults::DEFAULT_FUZZY_THRESHOLD,
            levenshtein_cap: defaults::DEFAULT_LEVENSHTEIN_CAP,
            early_position_window: defaults::DEFAULT_EARLY_POSITION_WINDOW,
        }
    }
}
