//! Best-effort TTL memoization over a pluggable backend.
//!
//! Keys are blake3 hashes of the operation name plus JSON-encoded arguments.
//! A backend error or an undecodable entry is logged and the computation
//! runs uncached.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aisle_core::errors::CacheError;
use aisle_core::traits::CacheBackend;
use aisle_observability::events;
use async_trait::async_trait;
use moka::sync::Cache as MokaCache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone)]
struct CachedValue {
    value: serde_json::Value,
    ttl: Duration,
}

/// Expire each entry after its own TTL.
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backend using moka.
///
/// TinyLFU admission, bounded entry count, per-entry TTL.
pub struct MokaBackend {
    cache: MokaCache<String, CachedValue>,
}

impl MokaBackend {
    pub fn new(max_entries: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl CacheBackend for MokaBackend {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Ok(self.cache.get(key).map(|c| c.value))
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), CachedValue { value, ttl });
        Ok(())
    }
}

/// Memoizes async computations.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Cache backed by an in-process moka store.
    pub fn in_memory(max_entries: u64) -> Self {
        Self::new(Arc::new(MokaBackend::new(max_entries)))
    }

    /// Cache key for `operation` called with `args`. `None` when the
    /// arguments cannot be serialized.
    pub fn key<A: Serialize + ?Sized>(operation: &str, args: &A) -> Option<String> {
        let encoded = serde_json::to_vec(args).ok()?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(operation.as_bytes());
        hasher.update(&[0]);
        hasher.update(&encoded);
        Some(hasher.finalize().to_hex().to_string())
    }

    /// Return the cached result of `operation(args)` or run `compute`,
    /// storing a successful result for `ttl`. Errors are never cached.
    pub async fn with_cache<T, E, A, F, Fut>(
        &self,
        operation: &str,
        args: &A,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = Self::key(operation, args);

        if let Some(key) = &key {
            match self.backend.get(key).await {
                Ok(Some(json)) => match serde_json::from_value::<T>(json) {
                    Ok(value) => {
                        events::cache_hit(operation);
                        return Ok(value);
                    }
                    Err(e) => events::cache_backend_error(operation, &e.to_string()),
                },
                Ok(None) => {}
                Err(e) => events::cache_backend_error(operation, &e.to_string()),
            }
        }

        let value = compute().await?;

        if let Some(key) = key {
            match serde_json::to_value(&value) {
                Ok(json) => {
                    if let Err(e) = self.backend.set(&key, json, ttl).await {
                        events::cache_backend_error(operation, &e.to_string());
                    }
                }
                Err(e) => events::cache_backend_error(operation, &e.to_string()),
            }
        }
        Ok(value)
    }
}
