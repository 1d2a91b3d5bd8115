use std::collections::HashMap;

use crate::{Hasher, Result, Sha256Hasher, VerifyError};

pub const DIGEST_LEN: usize = 32;

pub type Digest = [u8; DIGEST_LEN];

/// File name to SHA-256 digest, as published for one (product, version).
///
/// Each non-blank line is `<64 hex chars><whitespace><filename>`. Any other
/// shape rejects the whole manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    sums: HashMap<String, Digest>,
}

impl ChecksumManifest {
    pub fn parse(text: &str) -> Result<Self> {
        let mut sums = HashMap::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || VerifyError::ManifestParse {
                line:    idx + 1,
                content: line.to_string(),
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            let &[digest, filename] = fields.as_slice() else {
                return Err(malformed());
            };

            let mut bytes = [0u8; DIGEST_LEN];
            hex::decode_to_slice(digest, &mut bytes).map_err(|_| malformed())?;
            sums.insert(filename.to_string(), bytes);
        }

        Ok(Self { sums })
    }

    pub fn get(&self, filename: &str) -> Option<&Digest> { self.sums.get(filename) }

    pub fn len(&self) -> usize { self.sums.len() }

    pub fn is_empty(&self) -> bool { self.sums.is_empty() }

    pub fn filenames(&self) -> impl Iterator<Item = &str> { self.sums.keys().map(String::as_str) }

    /// Compares `content` against the recorded digest for `filename`.
    pub fn check(&self, filename: &str, content: &[u8]) -> Result<()> {
        let mut hasher = Sha256Hasher::new();
        hasher.update(content);
        self.check_digest(filename, &hasher.finalize())
    }

    pub fn check_digest(&self, filename: &str, actual: &[u8]) -> Result<()> {
        let expected = self.get(filename).ok_or_else(|| VerifyError::SumNotFound {
            filename: filename.to_string(),
        })?;

        if expected.as_slice() != actual {
            return Err(VerifyError::DigestMismatch {
                filename: filename.to_string(),
                expected: hex::encode(expected),
                actual:   hex::encode(actual),
            });
        }
        Ok(())
    }
}
