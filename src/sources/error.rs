use thiserror::Error;

/// Reasons an adapter could not deliver data. The run carries on without it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
