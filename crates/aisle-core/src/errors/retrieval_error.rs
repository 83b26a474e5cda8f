/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("{source_name} search failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    #[error("all retrieval sources failed: {reasons:?}")]
    AllSourcesFailed { reasons: Vec<String> },

    #[error("repository unavailable: {reason}")]
    RepositoryUnavailable { reason: String },

    #[error("embedding failed: {reason}")]
    EmbeddingFailed { reason: String },
}
