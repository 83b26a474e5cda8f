//! # aisle-resilience
//!
//! Every AI-backed call goes through a [`ResilientGateway`]: a
//! [`CircuitBreaker`] per operation plus an enforced timeout. [`Cache`] memoizes any async
//! computation with a TTL, best-effort.

pub mod cache;
pub mod circuit_breaker;
pub mod gateway;

pub use cache::{Cache, MokaBackend};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStatus, CircuitStateKind};
pub use gateway::ResilientGateway;
