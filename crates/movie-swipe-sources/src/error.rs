use thiserror::Error;

/// Failure talking to the movie provider or the rating store
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("movie {0} not found")]
    NotFound(u64),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("rating store error: {0}")]
    Store(String),

    #[error("{0} is not configured")]
    NotConfigured(String),
}

impl SourceError {
    /// Whether a later retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(_) | SourceError::Io(_) => true,
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
