use relcat_version::VersionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NameError {
    #[error("artifact name '{name}' has {found} fields, expected 4 delimited by '_'")]
    FieldCount { name: String, found: usize },

    #[error("artifact name '{name}' has an empty field")]
    EmptyField { name: String },

    #[error("'{name}' is not an archive")]
    NotAnArchive { name: String },

    #[error("link '{0}' has no file name")]
    NoFileName(String),

    #[error("invalid version in artifact name '{name}': {source}")]
    Version {
        name:   String,
        #[source]
        source: VersionError,
    },
}

pub type Result<T> = std::result::Result<T, NameError>;
