//! PaginationSessionManager: server-side pagination state.

use std::sync::Arc;

use aisle_core::config::SessionConfig;
use aisle_core::errors::SessionError;
use aisle_core::models::{ProductId, SessionExtra, SessionState};
use aisle_core::traits::SessionStore;
use aisle_observability::events;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Creates, reads, and atomically extends pagination sessions held in a
/// [`SessionStore`]. Updates are optimistic: read, modify, compare-and-swap,
/// retried up to `cas_retries` times.
pub struct PaginationSessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl PaginationSessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.config.key_prefix, session_id)
    }

    fn check_depth(&self, session_id: &str, batch_number: u32) -> Result<(), SessionError> {
        if batch_number > self.config.max_depth {
            events::session_depth_limit(session_id, self.config.max_depth);
            return Err(SessionError::MaxDepthExceeded {
                max_depth: self.config.max_depth,
                requested: batch_number,
            });
        }
        Ok(())
    }

    fn encode(state: &SessionState) -> Result<String, SessionError> {
        serde_json::to_string(state).map_err(|e| SessionError::StoreUnavailable {
            reason: format!("encode session: {e}"),
        })
    }

    fn remaining_ttl(state: &SessionState, now: DateTime<Utc>) -> std::time::Duration {
        (state.expires_at - now).to_std().unwrap_or_default()
    }

    pub async fn create_session(
        &self,
        delivered_ids: impl IntoIterator<Item = ProductId>,
        batch_number: u32,
        extra: SessionExtra,
    ) -> Result<SessionState, SessionError> {
        let session_id = Uuid::new_v4().to_string();
        self.check_depth(&session_id, batch_number)?;

        let now = Utc::now();
        let mut state = SessionState {
            session_id: session_id.clone(),
            delivered_ids: delivered_ids.into_iter().collect(),
            batch_number,
            extra,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(self.config.session_ttl_secs as i64),
            revision: 0,
        };
        state.revision = self
            .store
            .set(&self.key(&session_id), Self::encode(&state)?, self.config.session_ttl())
            .await?;
        debug!(session_id, delivered = state.delivered_ids.len(), "session created");
        Ok(state)
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionState, SessionError> {
        self.get_at(session_id, Utc::now()).await
    }

    async fn get_at(&self, session_id: &str, now: DateTime<Utc>) -> Result<SessionState, SessionError> {
        let expired = || SessionError::Expired {
            session_id: session_id.to_string(),
        };
        let stored = self.store.get(&self.key(session_id)).await?.ok_or_else(expired)?;
        let mut state: SessionState = serde_json::from_str(&stored.value).map_err(|e| {
            warn!(session_id, error = %e, "unreadable session");
            SessionError::StoreUnavailable {
                reason: format!("decode session: {e}"),
            }
        })?;
        if state.is_expired_at(now) {
            return Err(expired());
        }
        state.revision = stored.revision;
        Ok(state)
    }

    /// Record the page built from the session as it stood at `read_batch`:
    /// add `new_ids` to the delivered set and move to batch `read_batch + 1`.
    ///
    /// Fails with `MaxDepthExceeded` past the configured depth. Fails with
    /// `Conflict` when the session has moved past `read_batch`, when any of
    /// `new_ids` was already delivered, or when every optimistic attempt
    /// loses a race.
    pub async fn append_delivered(
        &self,
        session_id: &str,
        new_ids: &[ProductId],
        read_batch: u32,
    ) -> Result<SessionState, SessionError> {
        let next_batch = read_batch.saturating_add(1);
        self.check_depth(session_id, next_batch)?;
        let key = self.key(session_id);
        let attempts = self.config.cas_retries.max(1);
        let conflict = |attempts| SessionError::Conflict {
            session_id: session_id.to_string(),
            attempts,
        };

        for attempt in 1..=attempts {
            let now = Utc::now();
            let mut state = self.get_at(session_id, now).await?;
            if state.batch_number != read_batch {
                debug!(session_id, read_batch, found = state.batch_number, "session moved on");
                return Err(conflict(attempt));
            }
            if new_ids.iter().any(|id| state.delivered_ids.contains(id)) {
                warn!(session_id, "page overlaps delivered products");
                return Err(conflict(attempt));
            }
            state.delivered_ids.extend(new_ids.iter().cloned());
            state.batch_number = next_batch;

            let written = self
                .store
                .compare_and_swap(
                    &key,
                    state.revision,
                    Self::encode(&state)?,
                    Self::remaining_ttl(&state, now),
                )
                .await?;
            match written {
                Some(revision) => {
                    state.revision = revision;
                    return Ok(state);
                }
                None => debug!(session_id, attempt, "session update lost a race"),
            }
        }

        Err(conflict(attempts))
    }

    pub async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        self.store.delete(&self.key(session_id)).await
    }

    /// Delete every session under the prefix that has expired. For stores
    /// without native expiry. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<usize, SessionError> {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut removed = 0;
        for key in self.store.scan_prefix(&self.config.key_prefix).await? {
            let expired = match self.store.get(&key).await? {
                None => true,
                Some(stored) => serde_json::from_str::<SessionState>(&stored.value)
                    .map(|s| s.is_expired_at(now))
                    .unwrap_or(true),
            };
            if expired {
                self.store.delete(&key).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "purged expired sessions");
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for PaginationSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationSessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
