use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive is corrupted: {0}")]
    Corrupted(String),

    #[error("archive has no entry named '{entry}'")]
    EntryNotFound { entry: String },

    #[error("failed to place extracted entry: {source}")]
    Placement { source: relcat_fs::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<relcat_fs::Error> for Error {
    fn from(e: relcat_fs::Error) -> Self { Self::Placement { source: e } }
}

pub type Result<T> = std::result::Result<T, Error>;
