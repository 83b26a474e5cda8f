use async_trait::async_trait;

use crate::errors::RetrievalError;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}
