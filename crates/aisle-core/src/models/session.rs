use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ProductId;

/// Optional continuation state stored alongside the delivered ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionExtra {
    /// Categories derived in Tier 1, reused by Tier 2 on later pages.
    pub extracted_categories: Option<Vec<String>>,
    pub seed_embeddings: Option<Vec<Vec<f32>>>,
}

/// Server-held pagination state. `delivered_ids` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub delivered_ids: HashSet<ProductId>,
    pub batch_number: u32,
    #[serde(default)]
    pub extra: SessionExtra,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Store revision this state was read at. Not persisted.
    #[serde(skip)]
    pub revision: u64,
}

impl SessionState {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn has_delivered(&self, id: &str) -> bool {
        self.delivered_ids.contains(id)
    }
}
