//! # aisle-retrieval
//!
//! Candidate gathering against the product repository: concurrent text and
//! vector queries that degrade to whichever sources survive, filter-only
//! and category sweeps, and an embedding service memoized through the cache.

pub mod embedder;
pub mod retriever;

pub use embedder::CachedEmbedder;
pub use retriever::{CandidateRetriever, HybridResults};
