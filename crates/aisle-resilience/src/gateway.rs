//! Single entry point for AI-backed calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aisle_core::config::ResilienceConfig;
use aisle_core::errors::AiError;
use aisle_observability::events;
use dashmap::DashMap;
use tracing::debug;

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};

/// Circuit breakers plus a timeout around every AI call.
///
/// Failures are counted per operation, so a healthy classifier cannot mask
/// a failing reranker. Once any operation's breaker trips, the gateway is
/// open and every call short-circuits with [`AiError::CircuitOpen`] without
/// running until that breaker's cool-down ends. Errors and timeouts count as
/// failures; a completed call resets its own operation's counter.
#[derive(Debug, Clone)]
pub struct ResilientGateway {
    breakers: Arc<DashMap<String, Arc<CircuitBreaker>>>,
    breaker_config: CircuitBreakerConfig,
    timeout: Duration,
}

impl ResilientGateway {
    pub fn new(breaker_config: CircuitBreakerConfig, timeout: Duration) -> Self {
        Self {
            breakers: Arc::new(DashMap::new()),
            breaker_config,
            timeout,
        }
    }

    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self::new(CircuitBreakerConfig::from(config), config.ai_timeout())
    }

    /// The breaker counting failures of `operation`, created on first use.
    pub fn breaker(&self, operation: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(operation) {
            return existing.value().clone();
        }
        self.breakers
            .entry(operation.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::with_name(operation, self.breaker_config.clone()))
            })
            .value()
            .clone()
    }

    /// A breaker that is currently open, if any.
    pub fn open_breaker(&self) -> Option<Arc<CircuitBreaker>> {
        self.breakers
            .iter()
            .find(|entry| entry.value().is_open())
            .map(|entry| entry.value().clone())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether calls are currently being short-circuited.
    pub fn is_open(&self) -> bool {
        self.open_breaker().is_some()
    }

    pub async fn call<T, F, Fut>(&self, operation: &str, f: F) -> Result<T, AiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AiError>>,
    {
        if let Some(open) = self.open_breaker() {
            events::circuit_short_circuited(open.name(), operation);
            return Err(AiError::CircuitOpen {
                operation: operation.to_string(),
            });
        }

        let breaker = self.breaker(operation);
        match tokio::time::timeout(self.timeout, f()).await {
            Ok(Ok(value)) => {
                breaker.record_success();
                Ok(value)
            }
            Ok(Err(err)) => {
                debug!(operation, error = %err, "ai call failed");
                breaker.record_failure();
                Err(err)
            }
            Err(_) => {
                debug!(operation, timeout_ms = self.timeout.as_millis() as u64, "ai call timed out");
                breaker.record_failure();
                Err(AiError::Timeout {
                    operation: operation.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

impl Default for ResilientGateway {
    fn default() -> Self {
        Self::from_config(&ResilienceConfig::default())
    }
}
