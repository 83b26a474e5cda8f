use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aisle_core::errors::CacheError;
use aisle_core::traits::CacheBackend;
use aisle_resilience::Cache;
use async_trait::async_trait;

/// Backend whose every operation fails.
struct BrokenBackend;

#[async_trait]
impl CacheBackend for BrokenBackend {
    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Err(CacheError::BackendUnavailable {
            reason: "connection refused".into(),
        })
    }

    async fn set(
        &self,
        _key: &str,
        _value: serde_json::Value,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::BackendUnavailable {
            reason: "connection refused".into(),
        })
    }
}

async fn compute(counter: &AtomicUsize) -> Result<Vec<String>, String> {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(vec!["red wine".to_string()])
}

#[tokio::test]
async fn second_call_is_served_from_cache() {
    let cache = Cache::in_memory(100);
    let calls = AtomicUsize::new(0);
    let ttl = Duration::from_secs(60);

    let first = cache.with_cache("extract", "red wine", ttl, || compute(&calls)).await;
    let second = cache.with_cache("extract", "red wine", ttl, || compute(&calls)).await;

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn different_args_miss() {
    let cache = Cache::in_memory(100);
    let calls = AtomicUsize::new(0);
    let ttl = Duration::from_secs(60);

    let _ = cache.with_cache("extract", "red", ttl, || compute(&calls)).await;
    let _ = cache.with_cache("extract", "white", ttl, || compute(&calls)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn errors_are_not_cached() {
    let cache = Cache::in_memory(100);
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let ttl = Duration::from_secs(60);

    for _ in 0..2 {
        let out: Result<u32, String> = cache
            .with_cache("flaky", &1u32, ttl, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            })
            .await;
        assert!(out.is_err());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn broken_backend_still_returns_correct_value() {
    let cache = Cache::new(Arc::new(BrokenBackend));
    let calls = AtomicUsize::new(0);
    let ttl = Duration::from_secs(60);

    let out = cache.with_cache("extract", "red wine", ttl, || compute(&calls)).await;
    assert_eq!(out.unwrap(), vec!["red wine".to_string()]);
    let _ = cache.with_cache("extract", "red wine", ttl, || compute(&calls)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn entries_expire_after_ttl() {
    let cache = Cache::in_memory(100);
    let calls = AtomicUsize::new(0);
    let ttl = Duration::from_millis(30);

    let _ = cache.with_cache("embed", "x", ttl, || compute(&calls)).await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    let _ = cache.with_cache("embed", "x", ttl, || compute(&calls)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
