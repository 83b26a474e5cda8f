use async_trait::async_trait;

use crate::errors::AisleResult;
use crate::models::Complexity;

/// Manually curated or learned complexity decisions, keyed by exact query.
#[async_trait]
pub trait LearnedOverrideStore: Send + Sync {
    async fn lookup(&self, query: &str) -> AisleResult<Option<Complexity>>;
}
