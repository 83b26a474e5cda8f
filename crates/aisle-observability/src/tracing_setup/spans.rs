//! Span definitions per operation: search, load-more, retrieval, AI calls.

/// Create a search span.
#[macro_export]
macro_rules! search_span {
    ($store:expr, $query:expr) => {
        tracing::info_span!("aisle.search", store = %$store, query = %$query)
    };
}

/// Create a load-more span.
#[macro_export]
macro_rules! load_more_span {
    ($session:expr, $batch:expr) => {
        tracing::info_span!("aisle.load_more", session = %$session, batch = $batch)
    };
}

/// Create a retrieval span.
#[macro_export]
macro_rules! retrieval_span {
    ($kind:expr, $limit:expr) => {
        tracing::debug_span!("aisle.retrieval", kind = %$kind, limit = $limit)
    };
}

/// Create an AI call span.
#[macro_export]
macro_rules! ai_span {
    ($operation:expr) => {
        tracing::debug_span!("aisle.ai", operation = %$operation)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEARCH: &str = "aisle.search";
    pub const LOAD_MORE: &str = "aisle.load_more";
    pub const RETRIEVAL: &str = "aisle.retrieval";
    pub const AI: &str = "aisle.ai";
}
