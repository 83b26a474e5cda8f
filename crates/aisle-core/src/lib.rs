//! # aisle-core
//!
//! Foundation crate for the aisle hybrid product search engine.
//! Defines the data model, service traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod text;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::AisleConfig;
pub use errors::{AisleError, AisleResult};
pub use models::{
    Candidate, ExtractedFilters, HardFilters, PipelinePath, Product, ProductId, SoftFilters,
    TierTag,
};
