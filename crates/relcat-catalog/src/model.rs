//! Catalog records: products own versions, versions own builds.

use std::collections::HashMap;

use relcat_resource::{Platform, manifest_name, signature_name};
use relcat_version::SemVer;
use serde::Serialize;
use url::Url;

use crate::{LookupError, Result};

/// One downloadable artifact. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    pub product:  String,
    pub version:  String,
    pub os:       String,
    pub arch:     String,
    pub filename: String,
    pub url:      Url,
}

impl Build {
    pub fn platform(&self) -> Platform { Platform::new(&self.os, &self.arch) }
}

#[derive(Debug, Clone)]
pub struct Version {
    product:           String,
    version:           SemVer,
    shasums:           String,
    shasums_signature: String,
    builds:            HashMap<Platform, Build>,
}

impl Version {
    /// A version with no builds whose manifest references follow the
    /// `<product>_<version>_SHA256SUMS` convention.
    pub fn new(product: &str, version: SemVer) -> Self {
        Self {
            shasums: manifest_name(product, version.as_str()),
            shasums_signature: signature_name(product, version.as_str()),
            product: product.to_string(),
            version,
            builds: HashMap::new(),
        }
    }

    pub fn product(&self) -> &str { &self.product }

    /// The version string this entry is keyed by.
    pub fn as_str(&self) -> &str { self.version.as_str() }

    pub fn semver(&self) -> &SemVer { &self.version }

    /// File name of the checksum manifest.
    pub fn shasums(&self) -> &str { &self.shasums }

    /// File name of the manifest's detached signature. Stored, never checked.
    pub fn shasums_signature(&self) -> &str { &self.shasums_signature }

    pub fn set_manifest_refs(&mut self, shasums: String, signature: String) {
        self.shasums = shasums;
        self.shasums_signature = signature;
    }

    pub fn build(&self, platform: &Platform) -> Option<&Build> { self.builds.get(platform) }

    /// Builds ordered by platform.
    pub fn builds(&self) -> Vec<&Build> {
        let mut builds: Vec<_> = self.builds.values().collect();
        builds.sort_by(|a, b| (&a.os, &a.arch).cmp(&(&b.os, &b.arch)));
        builds
    }

    pub fn platforms(&self) -> Vec<&Platform> {
        let mut platforms: Vec<_> = self.builds.keys().collect();
        platforms.sort();
        platforms
    }

    /// Stores `build` under its platform, replacing any previous build there.
    pub fn upsert_build(&mut self, build: Build) -> Option<Build> {
        self.builds.insert(build.platform(), build)
    }

    /// Exact (os, arch) match. There is no fallback to a related platform.
    pub fn resolve_build(&self, platform: &Platform) -> Result<&Build> {
        self.build(platform).ok_or_else(|| LookupError::BuildNotFound {
            product:  self.product.clone(),
            version:  self.as_str().to_string(),
            platform: platform.clone(),
        })
    }
}

/// A product and its versions in ascending precedence.
///
/// Every key of `versions` appears exactly once in `sorted`, and every
/// element of `sorted` is the key of one entry in `versions`.
#[derive(Debug, Clone)]
pub struct Product {
    name:     String,
    versions: HashMap<String, Version>,
    sorted:   Vec<SemVer>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:     name.into(),
            versions: HashMap::new(),
            sorted:   Vec::new(),
        }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn len(&self) -> usize { self.sorted.len() }

    pub fn is_empty(&self) -> bool { self.sorted.is_empty() }

    /// Returns the entry semantically equal to `version`, creating it in
    /// sorted position if there is none. An existing entry keeps the
    /// spelling it was first inserted with.
    pub fn upsert_version(&mut self, version: SemVer) -> &mut Version {
        let key = match self.sorted.binary_search(&version) {
            Ok(idx) => self.sorted[idx].as_str().to_string(),
            Err(idx) => {
                let key = version.as_str().to_string();
                self.sorted.insert(idx, version.clone());
                key
            },
        };

        let product = &self.name;
        self.versions
            .entry(key)
            .or_insert_with(|| Version::new(product, version))
    }

    /// Adds a version without ordering it. Used while bulk loading; call
    /// [`Product::finish_bulk`] afterwards.
    pub(crate) fn push_unsorted(&mut self, version: Version) -> bool {
        if self.versions.contains_key(version.as_str()) {
            return false;
        }
        self.versions.insert(version.as_str().to_string(), version);
        true
    }

    /// Rebuilds the sorted sequence from the version map. Spellings that are
    /// semantically equal to an earlier one (in lexical key order) are
    /// dropped and returned.
    pub(crate) fn finish_bulk(&mut self) -> Vec<String> {
        let mut entries: Vec<(SemVer, String)> = self
            .versions
            .values()
            .map(|v| (v.semver().clone(), v.as_str().to_string()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let mut dropped = Vec::new();
        self.sorted.clear();
        for (semver, key) in entries {
            if self.sorted.last() == Some(&semver) {
                self.versions.remove(&key);
                dropped.push(key);
            } else {
                self.sorted.push(semver);
            }
        }
        dropped
    }

    /// Version strings, ascending.
    pub fn version_strings(&self) -> Vec<&str> { self.sorted.iter().map(SemVer::as_str).collect() }

    /// Versions, ascending.
    pub fn versions(&self) -> impl DoubleEndedIterator<Item = &Version> + '_ {
        self.sorted
            .iter()
            .filter_map(|v| self.versions.get(v.as_str()))
    }

    pub fn latest(&self) -> Option<&Version> {
        self.sorted.last().and_then(|v| self.versions.get(v.as_str()))
    }

    /// Exact lookup by spelling, then by semantic value.
    pub fn version(&self, version: &str) -> Option<&Version> {
        if let Some(found) = self.versions.get(version) {
            return Some(found);
        }
        let parsed = SemVer::parse(version).ok()?;
        let idx = self.sorted.binary_search(&parsed).ok()?;
        self.versions.get(self.sorted[idx].as_str())
    }
}
