use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Circuit breaker and cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Consecutive AI failures before the circuit opens.
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before resetting to closed.
    pub cooldown_secs: u64,
    /// Timeout enforced on every AI-backed call (milliseconds).
    pub ai_timeout_ms: u64,
    /// Max entries in the in-process cache.
    pub cache_capacity: u64,
    pub embedding_ttl_secs: u64,
    pub extraction_ttl_secs: u64,
    pub classification_ttl_secs: u64,
}

impl ResilienceConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            cooldown_secs: defaults::DEFAULT_COOLDOWN_SECS,
            ai_timeout_ms: defaults::DEFAULT_AI_TIMEOUT_MS,
            cache_capacity: defaults::DEFAULT_CACHE_CAPACITY,
            embedding_ttl_secs: defaults::DEFAULT_EMBEDDING_TTL_SECS,
            extraction_ttl_secs: defaults::DEFAULT_EXTRACTION_TTL_SECS,
            classification_ttl_secs: defaults::DEFAULT_CLASSIFICATION_TTL_SECS,
        }
    }
}
