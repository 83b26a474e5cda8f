use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SessionError;

/// A stored value and the revision it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: String,
    pub revision: u64,
}

/// Key-value store with TTL and prefix scan backing pagination sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, SessionError>;

    /// Unconditional write. Returns the new revision.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<u64, SessionError>;

    /// Write only if the key is still at `expected_revision`. Returns the new
    /// revision, or `None` when another writer got there first or the key
    /// expired.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected_revision: u64,
        value: String,
        ttl: Duration,
    ) -> Result<Option<u64>, SessionError>;

    async fn delete(&self, key: &str) -> Result<(), SessionError>;

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, SessionError>;
}
