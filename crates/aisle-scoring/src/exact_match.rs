//! Tiered exact/fuzzy text-match bonus.
//!
//! Tiers are evaluated in priority order and the first that matches wins:
//!
//! | tier | default bonus |
//! |---|---|
//! | exact equality | 100 000 |
//! | multi-word phrase at start | 150 000 |
//! | stemmed equality | 95 000 |
//! | multi-word phrase anywhere | 120 000 |
//! | substring at start | 65 000 |
//! | substring anywhere | 60 000 |
//! | stemmed token match | 58 000 to 62 000 |
//! | prefix / early position | 20 000 to 30 000 |
//! | word coverage ≥ 0.85 | 15 000 |
//! | fuzzy similarity ≥ 0.75 | 10 000 to 12 000 |
//!
//! Both sides are normalized (niqqud stripped, quotes collapsed, lowercased)
//! before any comparison.

use aisle_core::config::ScoringConfig;
use aisle_core::text::{normalize_text, tokenize};

use crate::hebrew::{stem_token, strip_niqqud};
use crate::levenshtein::similarity_capped;

/// A query normalized once and reused across every candidate name.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub normalized: String,
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let normalized = normalize_text(&strip_niqqud(query));
        let tokens = tokenize(&normalized);
        let stems = tokens.iter().map(|t| stem_token(t)).collect();
        Self {
            normalized,
            tokens,
            stems,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn is_multi_word(&self) -> bool {
        self.tokens.len() >= 2
    }

    fn stemmed_phrase(&self) -> String {
        self.stems.join(" ")
    }
}

fn is_boundary(s: &str, byte_idx: usize) -> bool {
    match s[byte_idx..].chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

fn boundary_before(s: &str, byte_idx: usize) -> bool {
    match s[..byte_idx].chars().next_back() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

/// `needle` occurs in `hay` delimited by word boundaries. Returns whether any
/// occurrence starts at byte 0 and whether any occurs at all.
fn phrase_positions(hay: &str, needle: &str) -> (bool, bool) {
    let mut at_start = false;
    let mut anywhere = false;
    for (idx, _) in hay.match_indices(needle) {
        if boundary_before(hay, idx) && is_boundary(hay, idx + needle.len()) {
            anywhere = true;
            if idx == 0 {
                at_start = true;
            }
        }
    }
    (at_start, anywhere)
}

/// Scores a candidate name against a query.
#[derive(Debug, Clone)]
pub struct ExactMatchScorer {
    config: ScoringConfig,
}

impl Default for ExactMatchScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ExactMatchScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Convenience wrapper normalizing `query` on every call.
    pub fn bonus(&self, name: &str, query: &str) -> u32 {
        self.bonus_prepared(name, &PreparedQuery::new(query))
    }

    pub fn bonus_prepared(&self, name: &str, query: &PreparedQuery) -> u32 {
        if query.is_empty() {
            return 0;
        }
        let c = &self.config;
        let name_norm = normalize_text(&strip_niqqud(name));
        if name_norm.is_empty() {
            return 0;
        }
        let q = query.normalized.as_str();

        if name_norm == q {
            return c.exact_equality_bonus;
        }

        let (phrase_at_start, phrase_anywhere) = phrase_positions(&name_norm, q);
        if query.is_multi_word() && phrase_at_start {
            return c.phrase_start_bonus;
        }

        let name_tokens = tokenize(&name_norm);
        let name_stems: Vec<String> = name_tokens.iter().map(|t| stem_token(t)).collect();
        if name_stems.join(" ") == query.stemmed_phrase() {
            return c.stemmed_equality_bonus;
        }

        if query.is_multi_word() && phrase_anywhere {
            return c.phrase_anywhere_bonus;
        }
        if name_norm.starts_with(q) {
            return c.substring_start_bonus;
        }
        if name_norm.contains(q) {
            return c.substring_anywhere_bonus;
        }

        if let Some(bonus) = self.stemmed_token_bonus(&name_stems, query) {
            return bonus;
        }
        if let Some(bonus) = self.prefix_bonus(&name_tokens, query) {
            return bonus;
        }
        if let Some(bonus) = self.coverage_bonus(&name_tokens, &name_stems, query) {
            return bonus;
        }
        self.fuzzy_bonus(&name_norm, &name_tokens, query)
    }

    fn stemmed_token_bonus(&self, name_stems: &[String], query: &PreparedQuery) -> Option<u32> {
        let c = &self.config;
        if query.is_multi_word() {
            let all = query.stems.iter().all(|s| name_stems.contains(s));
            return all.then_some(c.stemmed_token_all_bonus);
        }
        let stem = query.stems.first()?;
        if name_stems.first() == Some(stem) {
            Some(c.stemmed_token_first_bonus)
        } else if name_stems.contains(stem) {
            Some(c.stemmed_token_bonus)
        } else {
            None
        }
    }

    fn prefix_bonus(&self, name_tokens: &[String], query: &PreparedQuery) -> Option<u32> {
        let c = &self.config;
        let first = query.tokens.first()?;
        if first.chars().count() < 2 {
            return None;
        }
        if name_tokens.first().is_some_and(|t| t.starts_with(first.as_str())) {
            return Some(c.prefix_first_bonus);
        }
        name_tokens
            .iter()
            .take(c.early_position_window.max(1))
            .any(|t| t.starts_with(first.as_str()))
            .then_some(c.prefix_early_bonus)
    }

    fn coverage_bonus(
        &self,
        name_tokens: &[String],
        name_stems: &[String],
        query: &PreparedQuery,
    ) -> Option<u32> {
        if !query.is_multi_word() {
            return None;
        }
        let covered = query
            .tokens
            .iter()
            .zip(&query.stems)
            .filter(|(t, s)| name_tokens.contains(t) || name_stems.contains(s))
            .count();
        let ratio = covered as f64 / query.tokens.len() as f64;
        (ratio >= self.config.word_coverage_ratio).then_some(self.config.word_coverage_bonus)
    }

    fn fuzzy_bonus(&self, name_norm: &str, name_tokens: &[String], query: &PreparedQuery) -> u32 {
        let c = &self.config;
        let cap = c.levenshtein_cap;
        let whole = similarity_capped(name_norm, &query.normalized, cap);
        let per_token = if name_tokens.is_empty() {
            0.0
        } else {
            let total: f64 = query
                .tokens
                .iter()
                .map(|qt| {
                    name_tokens
                        .iter()
                        .map(|nt| similarity_capped(nt, qt, cap))
                        .fold(0.0, f64::max)
                })
                .sum();
            total / query.tokens.len() as f64
        };
        let best = whole.max(per_token);
        if best < c.fuzzy_threshold {
            return 0;
        }
        let span = (1.0 - c.fuzzy_threshold).max(f64::EPSILON);
        let t = ((best - c.fuzzy_threshold) / span).clamp(0.0, 1.0);
        let range = c.fuzzy_bonus_max.saturating_sub(c.fuzzy_bonus_min) as f64;
        c.fuzzy_bonus_min + (t * range).round() as u32
    }
}
