use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use aisle_core::errors::RetrievalError;
use aisle_core::models::{HardFilters, Product, ProductId, SoftFilters};
use aisle_core::text::{intersects_normalized, tokenize};
use aisle_core::traits::ProductRepository;
use async_trait::async_trait;

use super::lock;

/// Product repository over a fixed in-memory catalog.
///
/// Text search ranks by token hits (name match 3, name prefix 2, any other
/// field 1, tokens under three characters ignored). Vector search ranks by
/// cosine similarity of stored embeddings.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: Vec<Product>,
    text_calls: AtomicUsize,
    vector_calls: AtomicUsize,
    filter_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    sweep_calls: AtomicUsize,
    fail_text: AtomicBool,
    fail_vector: AtomicBool,
    text_queries: Mutex<Vec<String>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return f32::MIN;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

fn text_score(product: &Product, tokens: &[String]) -> usize {
    let name_tokens = tokenize(&product.name);
    let other = tokenize(
        &[
            product.description.as_str(),
            &product.category.join(" "),
            &product.soft_category.join(" "),
        ]
        .join(" "),
    );
    tokens
        .iter()
        .filter(|t| t.chars().count() > 2)
        .map(|t| {
            if name_tokens.contains(t) {
                3
            } else if name_tokens
                .iter()
                .any(|n| n.chars().count() > 2 && (n.starts_with(t.as_str()) || t.starts_with(n.as_str())))
            {
                2
            } else if other.contains(t) {
                1
            } else {
                0
            }
        })
        .sum()
}

impl InMemoryProductRepository {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Default::default()
        }
    }

    /// Repository over the golden catalog.
    pub fn wine_store() -> Self {
        Self::new(crate::wine_store())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn set_text_failing(&self, fail: bool) {
        self.fail_text.store(fail, Ordering::SeqCst);
    }

    pub fn set_vector_failing(&self, fail: bool) {
        self.fail_vector.store(fail, Ordering::SeqCst);
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn vector_calls(&self) -> usize {
        self.vector_calls.load(Ordering::SeqCst)
    }

    pub fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn sweep_calls(&self) -> usize {
        self.sweep_calls.load(Ordering::SeqCst)
    }

    /// Every text query received, in order.
    pub fn text_queries(&self) -> Vec<String> {
        lock(&self.text_queries).clone()
    }

    fn eligible<'a>(
        &'a self,
        hard: &'a HardFilters,
        exclude: &'a HashSet<ProductId>,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |p| hard.matches(p) && !exclude.contains(&p.id))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn text_search(
        &self,
        query: &str,
        hard: &HardFilters,
        _soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.text_queries).push(query.to_string());
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(RetrievalError::SourceFailed {
                source_name: "text".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        let tokens = tokenize(query);
        let mut scored: Vec<(usize, &Product)> = self
            .eligible(hard, exclude)
            .map(|p| (text_score(p, &tokens), p))
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(scored.into_iter().take(limit).map(|(_, p)| p.clone()).collect())
    }

    async fn vector_search(
        &self,
        embedding: &[f32],
        hard: &HardFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
        soft: Option<&SoftFilters>,
        enforce_soft: bool,
    ) -> Result<Vec<Product>, RetrievalError> {
        self.vector_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_vector.load(Ordering::SeqCst) {
            return Err(RetrievalError::SourceFailed {
                source_name: "vector".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        let required: Option<&[String]> = match soft {
            Some(s) if enforce_soft && !s.soft_category.is_empty() => Some(s.soft_category.as_slice()),
            _ => None,
        };
        let mut scored: Vec<(f32, &Product)> = self
            .eligible(hard, exclude)
            .filter(|p| !p.embedding.is_empty())
            .filter(|p| required.map_or(true, |r| intersects_normalized(&p.soft_category, r)))
            .map(|p| (cosine(embedding, &p.embedding), p))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(scored.into_iter().take(limit).map(|(_, p)| p.clone()).collect())
    }

    async fn filter_only_query(
        &self,
        hard: &HardFilters,
        _soft: &SoftFilters,
        limit: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.eligible(hard, exclude).take(limit).cloned().collect())
    }

    async fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RetrievalError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .filter_map(|id| self.products.iter().find(|p| &p.id == id).cloned())
            .collect())
    }

    async fn sweep_by_category(
        &self,
        categories: &[String],
        hard: &HardFilters,
        cap: usize,
        exclude: &HashSet<ProductId>,
    ) -> Result<Vec<Product>, RetrievalError> {
        self.sweep_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .eligible(hard, exclude)
            .filter(|p| p.in_any_category(categories))
            .take(cap)
            .cloned()
            .collect())
    }
}
