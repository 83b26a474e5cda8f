use serde::{Deserialize, Serialize};

use crate::constants::MAX_AI_DESCRIPTION_CHARS;
use crate::models::{Product, ProductId, SoftFilters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Complex,
}

impl Complexity {
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Simple)
    }
}

/// Whether the shopper asked for something narrow, and how many results a
/// rerank should keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificityVerdict {
    pub specific: bool,
    pub max_results: usize,
}

/// Where a classification decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    LearnedOverride,
    PriorTextMatch,
    Fallback,
    Ai,
}

/// Context handed to AI-backed services with each call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryContext {
    pub store_id: String,
    pub store_description: String,
    /// A preliminary text search already found a high-confidence hit.
    pub prior_text_match: bool,
}

/// Vocabulary list an extracted value is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    Category,
    Type,
    SoftCategory,
    Color,
}

/// Extraction output before vocabulary validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    pub category: Vec<String>,
    #[serde(rename = "type")]
    pub product_type: Vec<String>,
    pub soft_category: Vec<String>,
    pub color: Vec<String>,
    pub price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// A value dropped by vocabulary validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTerm {
    pub kind: VocabularyKind,
    pub value: String,
}

/// Product summary sent to rerank and validation services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankCandidate {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Vec<String>,
    pub soft_category: Vec<String>,
    pub colors: Vec<String>,
}

impl From<&Product> for RerankCandidate {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.chars().take(MAX_AI_DESCRIPTION_CHARS).collect(),
            price: p.price,
            category: p.category.clone(),
            soft_category: p.soft_category.clone(),
            colors: p.colors.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub context: QueryContext,
    pub candidates: Vec<RerankCandidate>,
    pub soft_filters: SoftFilters,
    pub max_results: usize,
    pub explain: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedItem {
    pub id: ProductId,
    pub explanation: Option<String>,
}
