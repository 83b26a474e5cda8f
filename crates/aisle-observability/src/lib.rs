//! # aisle-observability
//!
//! Tracing subscriber setup, span macros, structured log events, and
//! per-request degradation tracking.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::DegradationTracker;
pub use tracing_setup::{events, init_tracing, init_tracing_with};
