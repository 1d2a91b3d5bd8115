//! Semantic Versioning wrapper that remembers its original spelling.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use ::semver::{BuildMetadata, Prerelease, Version};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Result, VersionError};

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(?<major>[0-9]+)(?:\.(?<minor>[0-9]+))?(?:\.(?<patch>[0-9]+))?(?:-(?<pre>[0-9A-Za-z][-0-9A-Za-z.]*)|(?<attached>[A-Za-z][-0-9A-Za-z.]*))?(?:\+(?<build>[-0-9A-Za-z.]+))?$").unwrap()
});

/// A parsed release version.
///
/// Equality, hashing and ordering use the semantic value only, so `1.2` and
/// `1.2.0` are the same version. [`SemVer::as_str`] returns the spelling it
/// was parsed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemVer {
    raw:   String,
    inner: Version,
}

impl SemVer {
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        let caps = VERSION_REGEX
            .captures(raw)
            .ok_or_else(|| VersionError::Parse(s.to_string()))?;

        let numeric = |name: &str| -> Result<u64> {
            caps.name(name)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|_| VersionError::Parse(s.to_string()))
        };

        let mut inner = Version::new(numeric("major")?, numeric("minor")?, numeric("patch")?);

        if let Some(pre) = caps.name("pre").or_else(|| caps.name("attached")) {
            inner.pre = Prerelease::new(pre.as_str()).map_err(|source| VersionError::Component {
                input: s.to_string(),
                source,
            })?;
        }

        if let Some(build) = caps.name("build") {
            inner.build =
                BuildMetadata::new(build.as_str()).map_err(|source| VersionError::Component {
                    input: s.to_string(),
                    source,
                })?;
        }

        Ok(Self {
            raw: raw.to_string(),
            inner,
        })
    }

    /// Original spelling.
    pub fn as_str(&self) -> &str { &self.raw }

    /// Access underlying semver crate Version.
    pub fn inner(&self) -> &Version { &self.inner }

    pub fn major(&self) -> u64 { self.inner.major }

    pub fn minor(&self) -> u64 { self.inner.minor }

    pub fn patch(&self) -> u64 { self.inner.patch }

    pub fn pre(&self) -> &str { self.inner.pre.as_str() }

    pub fn build(&self) -> &str { self.inner.build.as_str() }

    pub fn is_prerelease(&self) -> bool { !self.inner.pre.is_empty() }
}

impl PartialEq for SemVer {
    fn eq(&self, other: &Self) -> bool { self.inner == other.inner }
}

impl Eq for SemVer {}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering { self.inner.cmp(&other.inner) }
}

impl Hash for SemVer {
    fn hash<H: Hasher>(&self, state: &mut H) { self.inner.hash(state); }
}

impl FromStr for SemVer {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for SemVer {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<SemVer> for String {
    fn from(v: SemVer) -> Self { v.raw }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.raw) }
}
