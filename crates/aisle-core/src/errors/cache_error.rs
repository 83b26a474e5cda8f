/// Cache backend errors. Never fatal: callers log and compute uncached.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("cached value could not be decoded: {reason}")]
    Decode { reason: String },
}
