use serde::{Deserialize, Serialize};

use crate::models::{Product, ProductId};

/// Which retrieval stage produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierTag {
    /// Literal or near-literal text hit (Tier 1, complex fusion).
    TextMatch,
    /// Category/vector expansion (Tier 2, emergency expansion).
    CategoryExpansion,
    /// Produced by the filter-only fast path.
    FilterOnly,
    /// Produced by a category sweep.
    Sweep,
    /// Recommendation attached to a unique product hit.
    Similarity,
}

/// A product under consideration for one request, with every signal the
/// ranking stages attach to it. Discarded once the response is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub product: Product,
    /// 0-based position in the text ranking; `None` when the text source did
    /// not return it.
    pub text_rank: Option<usize>,
    /// 0-based position in the vector ranking.
    pub vector_rank: Option<usize>,
    pub exact_match_bonus: u32,
    pub soft_category_match_count: u32,
    pub soft_category_weighted_score: f64,
    pub color_match: bool,
    pub rrf_score: f64,
    pub final_score: f64,
    /// Secondary key from the caller's profile; never outranks a text tier.
    pub profile_boost: f64,
    pub tier: TierTag,
    pub explanation: Option<String>,
}

impl Candidate {
    pub fn new(product: Product, tier: TierTag) -> Self {
        Self {
            product,
            text_rank: None,
            vector_rank: None,
            exact_match_bonus: 0,
            soft_category_match_count: 0,
            soft_category_weighted_score: 0.0,
            color_match: false,
            rrf_score: 0.0,
            final_score: 0.0,
            profile_boost: 0.0,
            tier,
            explanation: None,
        }
    }

    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn has_soft_match(&self) -> bool {
        self.soft_category_match_count > 0 || self.color_match
    }
}
