use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Pagination session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Highest batch number a session may reach.
    pub max_depth: u32,
    pub session_ttl_secs: u64,
    pub token_ttl_secs: u64,
    /// Key prefix for session entries in the session store.
    pub key_prefix: String,
    /// Optimistic-update attempts before giving up with a conflict.
    pub cas_retries: u32,
}

impl SessionConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::DEFAULT_MAX_DEPTH,
            session_ttl_secs: defaults::DEFAULT_SESSION_TTL_SECS,
            token_ttl_secs: defaults::DEFAULT_TOKEN_TTL_SECS,
            key_prefix: defaults::DEFAULT_SESSION_KEY_PREFIX.to_string(),
            cas_retries: defaults::DEFAULT_CAS_RETRIES,
        }
    }
}
