//! SessionStore over a concurrent map, for single-node deployments and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use aisle_core::errors::SessionError;
use aisle_core::traits::{SessionStore, Versioned};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    revision: u64,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process session store. Expired entries are invisible to reads and are
/// evicted lazily; `scan_prefix` still lists them until evicted.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: DashMap<String, Entry>,
    next_revision: AtomicU64,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bump(&self) -> u64 {
        self.next_revision.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, SessionError> {
        let now = Instant::now();
        let found = self.entries.get(key).map(|e| e.value().clone());
        match found {
            Some(entry) if entry.is_live(now) => Ok(Some(Versioned {
                value: entry.value,
                revision: entry.revision,
            })),
            Some(_) => {
                self.entries.remove_if(key, |_, e| !e.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<u64, SessionError> {
        let revision = self.bump();
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                revision,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(revision)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected_revision: u64,
        value: String,
        ttl: Duration,
    ) -> Result<Option<u64>, SessionError> {
        let now = Instant::now();
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(None);
        };
        if !entry.is_live(now) || entry.revision != expected_revision {
            return Ok(None);
        }
        let revision = self.bump();
        *entry = Entry {
            value,
            revision,
            expires_at: now + ttl,
        };
        Ok(Some(revision))
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, SessionError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn cas_rejects_stale_revisions() {
        let store = InMemorySessionStore::new();
        let r1 = store.set("s:1", "a".into(), TTL).await.unwrap();
        let r2 = store.compare_and_swap("s:1", r1, "b".into(), TTL).await.unwrap();
        assert!(r2.is_some());
        assert_eq!(store.compare_and_swap("s:1", r1, "c".into(), TTL).await.unwrap(), None);
        assert_eq!(store.get("s:1").await.unwrap().unwrap().value, "b");
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let store = InMemorySessionStore::new();
        let r = store.set("s:1", "a".into(), Duration::ZERO).await.unwrap();
        assert_eq!(store.get("s:1").await.unwrap(), None);
        assert_eq!(store.compare_and_swap("s:1", r, "b".into(), TTL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn scan_filters_by_prefix() {
        let store = InMemorySessionStore::new();
        store.set("aisle:session:1", "a".into(), TTL).await.unwrap();
        store.set("aisle:session:2", "b".into(), TTL).await.unwrap();
        store.set("other:3", "c".into(), TTL).await.unwrap();
        let mut keys = store.scan_prefix("aisle:session:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["aisle:session:1", "aisle:session:2"]);
    }
}
