use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CacheError;

/// Storage behind the memoization cache. Values are JSON documents.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}
