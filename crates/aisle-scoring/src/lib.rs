//! # aisle-scoring
//!
//! Pure ranking functions: exact/fuzzy text-match bonuses, Hebrew stemming,
//! bounded Levenshtein similarity, color synonym expansion, reciprocal rank
//! fusion with soft-category boosting, and profile boosts.

pub mod colors;
pub mod exact_match;
pub mod fusion;
pub mod hebrew;
pub mod levenshtein;
pub mod profile_boost;

pub use colors::expand_similar_colors;
pub use exact_match::{ExactMatchScorer, PreparedQuery};
pub use fusion::{BoostWeights, ScoreFusion};
pub use hebrew::{stem_hebrew, stem_token};
pub use levenshtein::{levenshtein, similarity};
