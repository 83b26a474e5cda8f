/// Errors from AI-backed operations (classification, extraction, reranking,
/// validation). Every variant counts as a circuit-breaker failure except
/// `CircuitOpen`, which is reported when the call was never attempted.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("circuit open, {operation} short-circuited")]
    CircuitOpen { operation: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("{operation} failed: {reason}")]
    ProviderFailed { operation: String, reason: String },

    #[error("{operation} returned an invalid response: {reason}")]
    InvalidResponse { operation: String, reason: String },
}

impl AiError {
    /// Whether the underlying call was actually attempted.
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Self::CircuitOpen { .. })
    }
}
