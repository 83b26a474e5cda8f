use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::RetrievalError;
use crate::models::{HardFilters, Product, ProductId, SoftFilters};

/// Query capabilities of the product catalog.
///
/// Ranked operations return products best-first; the position in the
/// returned vector is the source rank. Every query skips `exclude`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Full-text search. `soft` is a ranking hint only and must not exclude.
    async fn text_search(
        &self,
        query: &str,
        hard: &HardFilters,
        soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError>;

    /// Nearest-neighbour search. With `enforce_soft`, products must carry at
    /// least one of the given soft categories.
    async fn vector_search(
        &self,
        embedding: &[f32],
        hard: &HardFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
        soft: Option<&SoftFilters>,
        enforce_soft: bool,
    ) -> Result<Vec<Product>, RetrievalError>;

    /// Unranked structured query over hard filters.
    async fn filter_only_query(
        &self,
        hard: &HardFilters,
        soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError>;

    async fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RetrievalError>;

    /// Products in any of `categories` that also satisfy `hard`, at most `cap`.
    async fn sweep_by_category(
        &self,
        categories: &[String],
        hard: &HardFilters,
        cap: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError>;
}
