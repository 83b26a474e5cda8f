//! In-memory fakes of the engine's external services.

mod ai;
mod embedder;
mod repository;
mod stores;

use std::sync::Mutex;
use std::time::Duration;

use aisle_core::errors::AiError;

pub use ai::{ScriptedClassifier, ScriptedExtractor, ScriptedReranker, ScriptedValidator};
pub use embedder::HashEmbedder;
pub use repository::InMemoryProductRepository;
pub use stores::{InMemoryOverrideStore, InMemoryProfileStore};

/// How a scripted AI fake responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FakeMode {
    #[default]
    Succeed,
    /// Return a provider error immediately.
    Fail,
    /// Sleep before answering, long enough to trip the gateway timeout.
    Hang(Duration),
}

/// Mode shared between a fake and the test driving it.
#[derive(Debug, Default)]
pub(crate) struct ModeCell(Mutex<FakeMode>);

impl ModeCell {
    pub(crate) fn get(&self) -> FakeMode {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set(&self, mode: FakeMode) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = mode;
    }

    /// Apply the current mode, returning an error for `Fail`.
    pub(crate) async fn run(&self, operation: &str) -> Result<(), AiError> {
        match self.get() {
            FakeMode::Succeed => Ok(()),
            FakeMode::Fail => Err(AiError::ProviderFailed {
                operation: operation.to_string(),
                reason: "scripted failure".to_string(),
            }),
            FakeMode::Hang(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
