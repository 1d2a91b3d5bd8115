use std::io;

use relcat_resource::NameError;

/// Every variant aborts the install that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed checksum manifest at line {line}: '{content}'")]
    ManifestParse { line: usize, content: String },

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("no checksum recorded for '{filename}'")]
    SumNotFound { filename: String },

    #[error("checksum mismatch for '{filename}': expected {expected}, got {actual}")]
    DigestMismatch {
        filename: String,
        expected: String,
        actual:   String,
    },

    #[error("failed to fetch checksum manifest for {product} {version}: {source}")]
    ManifestFetch {
        product: String,
        version: String,
        #[source]
        source:  Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("'{0}' has no file name")]
    NoFileName(std::path::PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("hashing task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
