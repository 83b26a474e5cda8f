use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use aisle_core::errors::AisleResult;
use aisle_core::models::{Complexity, UserProfile};
use aisle_core::traits::{LearnedOverrideStore, ProfileStore};
use async_trait::async_trait;

use super::lock;

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
    calls: AtomicUsize,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        lock(&self.profiles).insert(profile.session_id.clone(), profile);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, session_id: &str) -> AisleResult<Option<UserProfile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.profiles).get(session_id).cloned())
    }
}

/// Overrides keyed by the exact query string.
#[derive(Debug, Default)]
pub struct InMemoryOverrideStore {
    overrides: Mutex<HashMap<String, Complexity>>,
    calls: AtomicUsize,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(self, query: &str, complexity: Complexity) -> Self {
        lock(&self.overrides).insert(query.to_string(), complexity);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LearnedOverrideStore for InMemoryOverrideStore {
    async fn lookup(&self, query: &str) -> AisleResult<Option<Complexity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.overrides).get(query).copied())
    }
}
