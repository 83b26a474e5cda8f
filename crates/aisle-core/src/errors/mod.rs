mod ai_error;
mod cache_error;
mod retrieval_error;
mod session_error;

pub use ai_error::AiError;
pub use cache_error::CacheError;
pub use retrieval_error::RetrievalError;
pub use session_error::SessionError;

/// Top-level error type for the aisle engine.
#[derive(Debug, thiserror::Error)]
pub enum AisleError {
    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("ai service error: {0}")]
    AiError(#[from] AiError),

    #[error("pagination error: {0}")]
    SessionError(#[from] SessionError),

    #[error("cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl AisleError {
    /// Errors the client must act on (restart pagination, fix the request)
    /// as opposed to generic server-side failures.
    pub fn is_user_visible(&self) -> bool {
        match self {
            Self::SessionError(e) => e.requires_restart(),
            Self::InvalidRequest { .. } => true,
            _ => false,
        }
    }
}

pub type AisleResult<T> = Result<T, AisleError>;
