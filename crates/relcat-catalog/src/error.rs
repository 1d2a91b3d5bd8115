use relcat_fetch::FetchError;
use relcat_resource::Platform;
use thiserror::Error;

/// A catalog query that found nothing. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("product '{product}' not found")]
    ProductNotFound { product: String },

    #[error("version '{version}' of '{product}' not found")]
    VersionNotFound { product: String, version: String },

    #[error("product '{product}' has no versions")]
    NoVersions { product: String },

    #[error("no {platform} build for {product} {version}")]
    BuildNotFound {
        product:  String,
        version:  String,
        platform: Platform,
    },
}

/// Failure while building a catalog. Fatal to that construction.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    Fetch(FetchError),

    #[error("failed to decode {url}: {source}")]
    Decode {
        url:    String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write response cache: {0}")]
    CacheWrite(#[source] relcat_fs::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("ingestion cancelled")]
    Cancelled,

    #[error("ingestion task failed: {0}")]
    Task(String),
}

impl From<FetchError> for IngestionError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Cache(source) => Self::CacheWrite(source),
            other => Self::Fetch(other),
        }
    }
}

pub type Result<T, E = LookupError> = std::result::Result<T, E>;
