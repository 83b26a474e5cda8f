//! Service interfaces the engine consumes. Every implementation is shared
//! across requests, so all traits are `Send + Sync` and object-safe.

mod ai;
mod cache;
mod embedding;
mod overrides;
mod profile;
mod repository;
mod session_store;

pub use ai::{ClassifierService, FilterExtractionService, Reranker, ValidationService};
pub use cache::CacheBackend;
pub use embedding::EmbeddingService;
pub use overrides::LearnedOverrideStore;
pub use profile::ProfileStore;
pub use repository::ProductRepository;
pub use session_store::{SessionStore, Versioned};
