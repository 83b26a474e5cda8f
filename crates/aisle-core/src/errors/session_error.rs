/// Pagination session and continuation token errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session expired: {session_id}")]
    Expired { session_id: String },

    #[error("maximum pagination depth exceeded: batch {requested} > {max_depth}")]
    MaxDepthExceeded { max_depth: u32, requested: u32 },

    #[error("invalid continuation token: {reason}")]
    InvalidToken { reason: String },

    #[error("continuation token expired (issued {age_secs}s ago)")]
    TokenExpired { age_secs: i64 },

    #[error("concurrent update conflict on session {session_id} after {attempts} attempts")]
    Conflict { session_id: String, attempts: u32 },

    #[error("session store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl SessionError {
    /// The client should restart pagination from the first page.
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            Self::Expired { .. }
                | Self::MaxDepthExceeded { .. }
                | Self::InvalidToken { .. }
                | Self::TokenExpired { .. }
        )
    }
}
