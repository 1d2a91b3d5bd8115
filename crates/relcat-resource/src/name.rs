use crate::{NameError, Platform, Result};

pub const NAME_DELIMITER: char = '_';

pub const MANIFEST_SUFFIX: &str = "SHA256SUMS";

/// Longest suffix first so `.tar.gz` wins over a bare `.gz`.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".zip"];

/// Splits a known archive extension off `name`.
pub fn strip_archive_extension(name: &str) -> Option<(&str, &'static str)> {
    ARCHIVE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(*ext).map(|stem| (stem, *ext)))
}

/// `<product>_<version>_SHA256SUMS`
pub fn manifest_name(product: &str, version: &str) -> String {
    format!("{product}{NAME_DELIMITER}{version}{NAME_DELIMITER}{MANIFEST_SUFFIX}")
}

/// `<product>_<version>_SHA256SUMS.sig`
pub fn signature_name(product: &str, version: &str) -> String {
    format!("{}.sig", manifest_name(product, version))
}

/// A file name decomposed along the artifact naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName {
    filename:  String,
    product:   String,
    version:   String,
    os:        String,
    arch:      String,
    extension: Option<&'static str>,
}

impl ArtifactName {
    /// Parses a bare file name (no directory part).
    ///
    /// The name must split into exactly four non-empty fields. A recognized
    /// archive extension is removed from the arch field; other names are
    /// accepted as-is so non-archive artifacts can still be verified.
    pub fn parse(filename: &str) -> Result<Self> {
        let fields: Vec<&str> = filename.split(NAME_DELIMITER).collect();
        let &[product, version, os, last] = fields.as_slice() else {
            return Err(NameError::FieldCount {
                name:  filename.to_string(),
                found: fields.len(),
            });
        };

        let (arch, extension) = match strip_archive_extension(last) {
            Some((arch, ext)) => (arch, Some(ext)),
            None => (last, None),
        };

        if [product, version, os, arch].iter().any(|f| f.is_empty()) {
            return Err(NameError::EmptyField {
                name: filename.to_string(),
            });
        }

        Ok(Self {
            filename: filename.to_string(),
            product: product.to_string(),
            version: version.to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
            extension,
        })
    }

    pub fn filename(&self) -> &str { &self.filename }

    pub fn product(&self) -> &str { &self.product }

    pub fn version(&self) -> &str { &self.version }

    pub fn os(&self) -> &str { &self.os }

    pub fn arch(&self) -> &str { &self.arch }

    pub fn extension(&self) -> Option<&'static str> { self.extension }

    pub fn is_archive(&self) -> bool { self.extension.is_some() }

    pub fn platform(&self) -> Platform { Platform::new(&self.os, &self.arch) }
}

impl std::str::FromStr for ArtifactName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.filename)
    }
}
