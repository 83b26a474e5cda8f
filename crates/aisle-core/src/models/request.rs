use serde::{Deserialize, Serialize};

/// The values a store's catalog actually contains. Extraction output is
/// validated against these lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogVocabulary {
    pub categories: Vec<String>,
    pub types: Vec<String>,
    pub soft_categories: Vec<String>,
    pub colors: Vec<String>,
}

/// Per-store settings resolved by the caller before a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreContext {
    pub store_id: String,
    /// Free-text description handed to AI services as context.
    pub description: String,
    pub vocabulary: CatalogVocabulary,
    /// Page size override; `None` uses the configured default.
    pub page_size: Option<usize>,
    /// Ask the reranker for short explanations.
    pub explain: bool,
}

/// The route a request took through the pipeline. Recorded in continuation
/// tokens so load-more resumes on the same route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePath {
    FilterOnlyFast,
    TwoStep,
    Complex,
    ZeroResultFallback,
}

impl PipelinePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilterOnlyFast => "filter_only_fast",
            Self::TwoStep => "two_step",
            Self::Complex => "complex",
            Self::ZeroResultFallback => "zero_result_fallback",
        }
    }
}
