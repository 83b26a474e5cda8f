//! Consecutive-failure circuit breaker with a fixed cool-down.
//!
//! Closed until `failure_threshold` consecutive failures, then open for
//! `open_cooldown`. The first check after the cool-down closes it again and
//! clears the counter. Any success clears the counter immediately.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use aisle_core::config::ResilienceConfig;
use aisle_observability::events;
use serde::{Deserialize, Serialize};

/// Configuration for a circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Cooldown duration while the circuit is open.
    pub open_cooldown: Duration,
}

impl CircuitBreakerConfig {
    #[must_use]
    pub fn new(failure_threshold: u32, open_cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            open_cooldown,
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl From<&ResilienceConfig> for CircuitBreakerConfig {
    fn from(c: &ResilienceConfig) -> Self {
        Self::new(c.failure_threshold, c.cooldown())
    }
}

/// Public-facing circuit state for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitStateKind {
    Closed,
    Open,
}

/// Snapshot of circuit breaker status for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerStatus {
    pub state: CircuitStateKind,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub open_cooldown_ms: u64,
    pub cooldown_remaining_ms: Option<u64>,
}

/// Thread-safe circuit breaker counting the failures of one AI operation.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    consecutive_failures: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self::with_name("ai", config)
    }

    #[must_use]
    pub fn with_name(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            consecutive_failures: AtomicU32::new(0),
            opened_at: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn opened_at(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        match self.opened_at.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Whether a call may proceed now.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Whether a call may proceed at `now`. Closes the circuit if the
    /// cool-down has elapsed.
    pub fn allow_at(&self, now: Instant) -> bool {
        let mut opened = self.opened_at();
        match *opened {
            None => true,
            Some(at) if now.saturating_duration_since(at) >= self.config.open_cooldown => {
                *opened = None;
                self.consecutive_failures.store(0, Ordering::SeqCst);
                events::circuit_closed(&self.name);
                true
            }
            Some(_) => false,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.allow()
    }

    pub fn is_open_at(&self, now: Instant) -> bool {
        !self.allow_at(now)
    }

    /// Record a successful call. Clears the failure counter.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    /// Record a failed call at `now`; opens the circuit at the threshold.
    pub fn record_failure_at(&self, now: Instant) {
        let failures = self
            .consecutive_failures
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1);
        if failures < self.config.failure_threshold {
            return;
        }
        let mut opened = self.opened_at();
        if opened.is_none() {
            *opened = Some(now);
            events::circuit_opened(&self.name, failures, self.config.failure_threshold);
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status(&self) -> CircuitBreakerStatus {
        let opened = *self.opened_at();
        let remaining = opened.and_then(|at| self.config.open_cooldown.checked_sub(at.elapsed()));
        CircuitBreakerStatus {
            state: if remaining.is_some() {
                CircuitStateKind::Open
            } else {
                CircuitStateKind::Closed
            },
            consecutive_failures: self.consecutive_failures(),
            failure_threshold: self.config.failure_threshold,
            open_cooldown_ms: self.config.open_cooldown.as_millis() as u64,
            cooldown_remaining_ms: remaining.map(|d| d.as_millis() as u64),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig::new(3, Duration::from_secs(60)))
    }

    #[test]
    fn starts_closed() {
        let b = breaker();
        assert!(b.allow());
        assert_eq!(b.status().state, CircuitStateKind::Closed);
    }

    #[test]
    fn opens_after_threshold() {
        let b = breaker();
        let t0 = Instant::now();
        b.record_failure_at(t0);
        b.record_failure_at(t0);
        assert!(b.allow_at(t0));
        b.record_failure_at(t0);
        assert!(!b.allow_at(t0));
        assert!(!b.allow_at(t0 + Duration::from_secs(59)));
        assert_eq!(b.status().state, CircuitStateKind::Open);
    }

    #[test]
    fn success_resets_counter() {
        let b = breaker();
        b.record_failure();
        b.record_failure();
        b.record_success();
        assert_eq!(b.consecutive_failures(), 0);
        b.record_failure();
        b.record_failure();
        assert!(b.allow());
    }

    #[test]
    fn closes_after_cooldown() {
        let b = breaker();
        let t0 = Instant::now();
        for _ in 0..3 {
            b.record_failure_at(t0);
        }
        assert!(b.is_open_at(t0));
        assert!(b.allow_at(t0 + Duration::from_secs(60)));
        assert_eq!(b.consecutive_failures(), 0);
        // A single failure after reset does not reopen.
        b.record_failure_at(t0 + Duration::from_secs(61));
        assert!(b.allow_at(t0 + Duration::from_secs(61)));
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let b = CircuitBreaker::new(CircuitBreakerConfig::new(0, Duration::from_secs(1)));
        assert!(b.allow());
        b.record_failure();
        assert!(b.is_open());
    }
}
