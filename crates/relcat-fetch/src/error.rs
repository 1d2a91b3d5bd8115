//! Error types for relcat-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("response from {url} is not valid UTF-8")]
    InvalidUtf8 { url: String },

    #[error("client setup failed: {0}")]
    Client(String),

    #[error(transparent)]
    Cache(#[from] relcat_fs::Error),
}

impl FetchError {
    /// True for 404/410, the statuses that mean "no such resource".
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404 | 410, .. })
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
