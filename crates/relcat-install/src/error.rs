use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Lookup(#[from] relcat_catalog::LookupError),

    #[error("download failed: {0}")]
    Fetch(#[from] relcat_fetch::FetchError),

    #[error("integrity check failed: {0}")]
    Verify(#[from] relcat_verify::VerifyError),

    #[error("extraction failed: {0}")]
    Extract(#[from] relcat_archive::Error),

    #[error("failed to place file: {0}")]
    Place(#[from] relcat_fs::Error),

    #[error("install task failed: {0}")]
    Task(String),
}

impl InstallError {
    /// True when nothing matched the request, as opposed to a failure.
    pub fn is_not_found(&self) -> bool { matches!(self, Self::Lookup(_)) }
}

pub type Result<T> = std::result::Result<T, InstallError>;
