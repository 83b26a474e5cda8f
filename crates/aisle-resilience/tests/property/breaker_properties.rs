use std::time::{Duration, Instant};

use aisle_resilience::{CircuitBreaker, CircuitBreakerConfig};
use proptest::prelude::*;

proptest! {
    #[test]
    fn open_iff_threshold_consecutive_failures(threshold in 1u32..10, failures in 0u32..20) {
        let b = CircuitBreaker::new(CircuitBreakerConfig::new(threshold, Duration::from_secs(60)));
        let t0 = Instant::now();
        for _ in 0..failures {
            b.record_failure_at(t0);
        }
        prop_assert_eq!(b.is_open_at(t0), failures >= threshold);
    }

    #[test]
    fn one_success_fully_resets(threshold in 2u32..10, before in 0u32..10) {
        let before = before.min(threshold - 1);
        let b = CircuitBreaker::new(CircuitBreakerConfig::new(threshold, Duration::from_secs(60)));
        let t0 = Instant::now();
        for _ in 0..before {
            b.record_failure_at(t0);
        }
        b.record_success();
        prop_assert_eq!(b.consecutive_failures(), 0);
        for _ in 0..threshold - 1 {
            b.record_failure_at(t0);
        }
        prop_assert!(!b.is_open_at(t0));
    }

    #[test]
    fn short_circuits_for_whole_cooldown(secs in 0u64..60) {
        let b = CircuitBreaker::new(CircuitBreakerConfig::new(3, Duration::from_secs(60)));
        let t0 = Instant::now();
        for _ in 0..3 {
            b.record_failure_at(t0);
        }
        prop_assert!(b.is_open_at(t0 + Duration::from_secs(secs)));
        prop_assert!(!b.is_open_at(t0 + Duration::from_secs(60)));
    }
}
