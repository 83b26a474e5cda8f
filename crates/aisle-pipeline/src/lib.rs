//! # aisle-pipeline
//!
//! The search handler as an explicit state machine:
//!
//! ```text
//! entry ─┬─ FilterOnlyFast ───────────────────────────┐
//!        ├─ TwoStepTier1 ─┬─ TwoStepTier2 ────────────┤
//!        │                └───────────────────────────┤
//!        └─ ComplexRerank ────────────────────────────┤
//!                                                     ├─ EmergencyExpansion ─┐
//!                                                     └──────────────────────┴─ Done
//! ```
//!
//! `Done` applies the hard-filter gate, falls back to one unfiltered text
//! search when nothing survived, cuts the page, and issues a continuation
//! token backed by a pagination session.

pub mod gate;
pub mod orchestrator;
pub mod request;
pub mod rerank;
pub mod services;
pub mod state;
mod steps;

pub use orchestrator::PipelineOrchestrator;
pub use request::{SearchPage, SearchRequest};
pub use services::PipelineServices;
pub use state::PipelineState;
