//! Validation of extracted values against a store's vocabulary.
//!
//! A value is accepted when it matches an allowed value by, in order: exact
//! normalized equality, Hebrew vowel-insensitive equality, suffix-stripped
//! equality, or (colors only) membership in the same color family. Accepted
//! values are replaced by the vocabulary's own spelling.

use aisle_core::models::{
    CatalogVocabulary, ExtractedFilters, HardFilters, RawExtraction, RejectedTerm, SoftFilters,
    VocabularyKind,
};
use aisle_core::text::{normalize_category, tokenize};
use aisle_scoring::colors::same_color_family;
use aisle_scoring::hebrew::{stem_token, vowel_skeleton};

use crate::specificity::keep_most_specific;

fn skeleton(value: &str) -> String {
    tokenize(value)
        .iter()
        .map(|t| vowel_skeleton(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn stemmed(value: &str) -> String {
    tokenize(value)
        .iter()
        .map(|t| stem_token(t))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy)]
pub struct VocabularyValidator<'a> {
    vocabulary: &'a CatalogVocabulary,
}

impl<'a> VocabularyValidator<'a> {
    pub fn new(vocabulary: &'a CatalogVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn allowed(&self, kind: VocabularyKind) -> &'a [String] {
        match kind {
            VocabularyKind::Category => &self.vocabulary.categories,
            VocabularyKind::Type => &self.vocabulary.types,
            VocabularyKind::SoftCategory => &self.vocabulary.soft_categories,
            VocabularyKind::Color => &self.vocabulary.colors,
        }
    }

    /// The vocabulary spelling `value` resolves to, if any.
    pub fn resolve(&self, kind: VocabularyKind, value: &str) -> Option<String> {
        let allowed = self.allowed(kind);
        let norm = normalize_category(value);
        if norm.is_empty() {
            return None;
        }

        if let Some(hit) = allowed.iter().find(|a| normalize_category(a) == norm) {
            return Some(hit.clone());
        }
        let skel = skeleton(&norm);
        if let Some(hit) = allowed.iter().find(|a| skeleton(a) == skel) {
            return Some(hit.clone());
        }
        let stem = stemmed(&norm);
        if let Some(hit) = allowed.iter().find(|a| stemmed(a) == stem) {
            return Some(hit.clone());
        }
        if kind == VocabularyKind::Color {
            return allowed.iter().find(|a| same_color_family(a, &norm)).cloned();
        }
        None
    }

    fn resolve_all(
        &self,
        kind: VocabularyKind,
        values: &[String],
        rejected: &mut Vec<RejectedTerm>,
    ) -> Vec<String> {
        let mut accepted = Vec::new();
        for value in values {
            match self.resolve(kind, value) {
                Some(canonical) => accepted.push(canonical),
                None => rejected.push(RejectedTerm {
                    kind,
                    value: value.clone(),
                }),
            }
        }
        accepted
    }

    /// Validated filters plus every value that had no vocabulary match.
    pub fn validate(&self, raw: &RawExtraction) -> (ExtractedFilters, Vec<RejectedTerm>) {
        let mut rejected = Vec::new();

        let category = self.resolve_all(VocabularyKind::Category, &raw.category, &mut rejected);
        let product_type = self.resolve_all(VocabularyKind::Type, &raw.product_type, &mut rejected);
        let soft_category =
            self.resolve_all(VocabularyKind::SoftCategory, &raw.soft_category, &mut rejected);
        let color = self.resolve_all(VocabularyKind::Color, &raw.color, &mut rejected);

        let positive = |p: Option<f64>| p.filter(|v| v.is_finite() && *v >= 0.0);
        let (mut min_price, mut max_price) = (positive(raw.min_price), positive(raw.max_price));
        if let (Some(lo), Some(hi)) = (min_price, max_price) {
            if lo > hi {
                min_price = Some(hi);
                max_price = Some(lo);
            }
        }

        let filters = ExtractedFilters {
            hard: HardFilters {
                category: keep_most_specific(category),
                product_type: keep_most_specific(product_type),
                price: positive(raw.price),
                min_price,
                max_price,
            },
            soft: SoftFilters {
                soft_category: keep_most_specific(soft_category),
                color: keep_most_specific(color),
            },
        };
        (filters, rejected)
    }
}
