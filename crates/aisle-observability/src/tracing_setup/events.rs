//! Structured log events. Every event carries an `event` field so logs can
//! be filtered by kind.

use tracing::{debug, info, warn};

pub fn circuit_opened(name: &str, failures: u32, threshold: u32) {
    warn!(
        event = "circuit_opened",
        circuit = name,
        failures,
        threshold,
        "circuit opened after consecutive failures"
    );
}

pub fn circuit_closed(name: &str) {
    info!(event = "circuit_closed", circuit = name, "circuit closed after cooldown");
}

/// A call skipped because the circuit is open. A routing decision, not an error.
pub fn circuit_short_circuited(name: &str, operation: &str) {
    info!(
        event = "circuit_short_circuited",
        circuit = name,
        operation,
        "ai call short-circuited to fallback"
    );
}

pub fn degradation_triggered(component: &str, fallback: &str, reason: &str) {
    warn!(
        event = "degradation",
        component,
        fallback,
        reason,
        "falling back"
    );
}

pub fn path_selected(path: &str, query: &str, reason: &str) {
    info!(event = "path_selected", path, query, reason, "pipeline path selected");
}

pub fn cache_backend_error(operation: &str, error: &str) {
    warn!(
        event = "cache_backend_error",
        operation,
        error,
        "cache backend error, continuing uncached"
    );
}

pub fn cache_hit(operation: &str) {
    debug!(event = "cache_hit", operation, "cache hit");
}

pub fn session_depth_limit(session_id: &str, max_depth: u32) {
    warn!(
        event = "session_depth_limit",
        session_id,
        max_depth,
        "pagination depth limit reached"
    );
}

pub fn search_completed(path: &str, returned: usize, has_more: bool, elapsed_ms: u64) {
    info!(
        event = "search_completed",
        path,
        returned,
        has_more,
        elapsed_ms,
        "search completed"
    );
}
