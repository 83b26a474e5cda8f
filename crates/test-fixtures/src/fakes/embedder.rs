use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use aisle_core::errors::RetrievalError;
use aisle_core::models::Product;
use aisle_core::text::tokenize;
use aisle_core::traits::EmbeddingService;
use async_trait::async_trait;

/// Deterministic bag-of-tokens embedder: each token hashes (blake3) to one
/// signed dimension, and the result is L2-normalized. Texts sharing tokens
/// have positive cosine similarity.
#[derive(Debug, Default)]
pub struct HashEmbedder {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl HashEmbedder {
    pub const DIMS: usize = 64;

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; Self::DIMS];
        for token in tokenize(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let idx = bytes[0] as usize % Self::DIMS;
            let sign = if bytes[1] & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    /// Text a catalog product is embedded from.
    pub fn product_text(p: &Product) -> String {
        [
            p.name.as_str(),
            &p.category.join(" "),
            &p.product_type.join(" "),
            &p.soft_category.join(" "),
            &p.colors.join(" "),
        ]
        .join(" ")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingService for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RetrievalError::EmbeddingFailed {
                reason: "scripted failure".to_string(),
            });
        }
        Ok(self.embed_sync(text))
    }
}
