use relcat_version::SemVer;
use url::Url;

use crate::{ArtifactName, NameError, Platform, Result};

/// A discovered artifact: one (product, version, platform) build and where
/// to download it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub product:  String,
    pub version:  SemVer,
    pub platform: Platform,
    pub filename: String,
    pub url:      Url,
}

impl Release {
    pub fn from_name(name: &ArtifactName, url: Url) -> Result<Self> {
        let version = SemVer::parse(name.version()).map_err(|source| NameError::Version {
            name: name.filename().to_string(),
            source,
        })?;

        Ok(Self {
            product: name.product().to_string(),
            version,
            platform: name.platform(),
            filename: name.filename().to_string(),
            url,
        })
    }

    /// Builds a release from an archive link, using the last path segment as
    /// the artifact name.
    pub fn from_url(url: Url) -> Result<Self> {
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NameError::NoFileName(url.to_string()))?
            .to_string();

        let name = ArtifactName::parse(&filename)?;
        if !name.is_archive() {
            return Err(NameError::NotAnArchive { name: filename });
        }

        Self::from_name(&name, url)
    }
}
