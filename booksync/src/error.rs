use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The request never completed (connection refused, timeout, reset).
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Success status, but the body is not the structured data we asked for.
    #[error("Invalid JSON from {url}: {body}")]
    Decode { url: String, body: String },

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Validation(String),
}

impl From<url::ParseError> for SyncError {
    fn from(e: url::ParseError) -> Self {
        SyncError::InvalidUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
