use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version: '{0}'")]
    Parse(String),

    #[error("invalid version '{input}': {source}")]
    Component {
        input:  String,
        #[source]
        source: ::semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, VersionError>;
