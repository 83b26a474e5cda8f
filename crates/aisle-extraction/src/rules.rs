//! Deterministic classification and extraction.
//!
//! Used directly for the filter-only fast path and as the fallback strategy
//! whenever the AI gateway is open or an AI call fails.

use aisle_core::constants::DEFAULT_SPECIFICITY_MAX_RESULTS;
use aisle_core::errors::AiError;
use aisle_core::models::{
    CatalogVocabulary, Complexity, QueryContext, RawExtraction, SpecificityVerdict,
    VocabularyKind,
};
use aisle_core::text::tokenize;
use aisle_core::traits::{ClassifierService, FilterExtractionService};
use aisle_scoring::hebrew::{contains_hebrew, stem_token, vowel_skeleton};
use async_trait::async_trait;

use crate::price::extract_price;
use crate::validation::VocabularyValidator;

/// Tokens that carry no filter meaning.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "the", "of", "for", "with", "to", "in", "on", "some", "i", "want", "need",
    "looking", "show", "me", "please", "של", "עם", "את", "על", "בשביל", "עבור", "מה", "יש",
    "רוצה", "מחפש", "מחפשת", "לי", "או",
];

/// Single-letter Hebrew prefixes ("ליין", "והיין") stripped when matching.
const HEBREW_PREFIXES: &[char] = &['ו', 'ה', 'ב', 'ל', 'מ', 'ש', 'כ'];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

fn token_forms(token: &str) -> Vec<String> {
    let mut forms = vec![token.to_string()];
    if contains_hebrew(token) && token.chars().count() > 3 {
        if let Some(rest) = token.strip_prefix(HEBREW_PREFIXES) {
            forms.push(rest.to_string());
        }
    }
    forms
}

fn token_matches(query_token: &str, vocab_token: &str) -> bool {
    token_forms(query_token).iter().any(|form| {
        form == vocab_token
            || stem_token(form) == stem_token(vocab_token)
            || (contains_hebrew(form) && vowel_skeleton(form) == vowel_skeleton(vocab_token))
    })
}

/// Rule-based reading of a query against the store vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleExtraction {
    pub raw: RawExtraction,
    /// Query tokens that are not stopwords.
    pub meaningful_tokens: usize,
    /// Meaningful tokens consumed by a vocabulary phrase or a price pattern.
    pub covered_tokens: usize,
    /// A price pattern matched and nothing else in the query carries meaning.
    pub price_only: bool,
}

impl RuleExtraction {
    /// Share of meaningful tokens explained by the extracted filters.
    pub fn coverage(&self) -> f64 {
        if self.meaningful_tokens == 0 {
            return 0.0;
        }
        self.covered_tokens as f64 / self.meaningful_tokens as f64
    }

    pub fn has_filters(&self) -> bool {
        let r = &self.raw;
        !(r.category.is_empty()
            && r.product_type.is_empty()
            && r.soft_category.is_empty()
            && r.color.is_empty()
            && r.price.is_none()
            && r.min_price.is_none()
            && r.max_price.is_none())
    }
}

struct Phrase<'a> {
    kind: VocabularyKind,
    value: &'a str,
    tokens: Vec<String>,
}

/// Longest-phrase-first vocabulary matching plus price patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, query: &str, vocabulary: &CatalogVocabulary) -> RuleExtraction {
        let tokens = tokenize(query);
        let mut consumed = vec![false; tokens.len()];
        let mut raw = RawExtraction::default();

        let price = extract_price(query);
        if let Some(m) = &price {
            for price_token in tokenize(&m.matched) {
                if let Some(i) = (0..tokens.len()).find(|&i| !consumed[i] && tokens[i] == price_token)
                {
                    consumed[i] = true;
                }
            }
            raw.price = m.price;
            raw.min_price = m.min_price;
            raw.max_price = m.max_price;
        }

        let validator = VocabularyValidator::new(vocabulary);
        let mut phrases: Vec<Phrase<'_>> = [
            VocabularyKind::Category,
            VocabularyKind::Type,
            VocabularyKind::SoftCategory,
            VocabularyKind::Color,
        ]
        .into_iter()
        .flat_map(|kind| {
            validator.allowed(kind).iter().map(move |value| Phrase {
                kind,
                value,
                tokens: tokenize(value),
            })
        })
        .filter(|p| !p.tokens.is_empty())
        .collect();
        phrases.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));

        let mut vocabulary_hit = false;
        for phrase in &phrases {
            let n = phrase.tokens.len();
            if n > tokens.len() {
                continue;
            }
            let start = (0..=tokens.len() - n).find(|&i| {
                (0..n).all(|j| !consumed[i + j] && token_matches(&tokens[i + j], &phrase.tokens[j]))
            });
            if let Some(i) = start {
                consumed[i..i + n].iter_mut().for_each(|c| *c = true);
                push_unique(field_mut(&mut raw, phrase.kind), phrase.value);
                vocabulary_hit = true;
            }
        }

        // Color words outside the vocabulary's literal spelling ("בורדו" for "red").
        for (i, token) in tokens.iter().enumerate() {
            if consumed[i] || is_stopword(token) {
                continue;
            }
            if let Some(color) = validator.resolve(VocabularyKind::Color, token) {
                consumed[i] = true;
                push_unique(&mut raw.color, &color);
                vocabulary_hit = true;
            }
        }

        let meaningful: Vec<usize> = (0..tokens.len()).filter(|&i| !is_stopword(&tokens[i])).collect();
        let covered = meaningful.iter().filter(|&&i| consumed[i]).count();

        RuleExtraction {
            price_only: price.is_some() && !vocabulary_hit && covered == meaningful.len(),
            meaningful_tokens: meaningful.len(),
            covered_tokens: covered,
            raw,
        }
    }
}

fn field_mut(raw: &mut RawExtraction, kind: VocabularyKind) -> &mut Vec<String> {
    match kind {
        VocabularyKind::Category => &mut raw.category,
        VocabularyKind::Type => &mut raw.product_type,
        VocabularyKind::SoftCategory => &mut raw.soft_category,
        VocabularyKind::Color => &mut raw.color,
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

#[async_trait]
impl FilterExtractionService for RuleBasedExtractor {
    async fn extract(
        &self,
        query: &str,
        vocabulary: &CatalogVocabulary,
        _context: &QueryContext,
    ) -> Result<RawExtraction, AiError> {
        Ok(self.analyze(query, vocabulary).raw)
    }
}

/// Short queries are simple; specificity is always broad.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub const SIMPLE_MAX_TOKENS: usize = 2;

    pub fn new() -> Self {
        Self
    }

    pub fn complexity(&self, query: &str) -> Complexity {
        if tokenize(query).len() <= Self::SIMPLE_MAX_TOKENS {
            Complexity::Simple
        } else {
            Complexity::Complex
        }
    }

    pub fn specificity(&self) -> SpecificityVerdict {
        SpecificityVerdict {
            specific: false,
            max_results: DEFAULT_SPECIFICITY_MAX_RESULTS,
        }
    }
}

#[async_trait]
impl ClassifierService for RuleBasedClassifier {
    async fn classify_complexity(
        &self,
        query: &str,
        _context: &QueryContext,
    ) -> Result<Complexity, AiError> {
        Ok(self.complexity(query))
    }

    async fn classify_specificity(
        &self,
        _query: &str,
        _context: &QueryContext,
    ) -> Result<SpecificityVerdict, AiError> {
        Ok(self.specificity())
    }
}
