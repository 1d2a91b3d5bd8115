//! Integrity verification for downloaded release artifacts.
//!
//! An artifact is trusted only after [`IntegrityVerifier::verify`] has
//! matched its SHA-256 digest against the checksum manifest published for
//! its (product, version). Signature references are carried by the catalog
//! but not checked here.
//!
//! # Example
//!
//! ```
//! use relcat_verify::{ChecksumManifest, Sha256Hasher};
//!
//! let digest = hex::encode(Sha256Hasher::digest(b"binary"));
//! let text = format!("{digest}  tool_1.0.0_linux_amd64.zip\n");
//! let manifest = ChecksumManifest::parse(&text).unwrap();
//!
//! manifest.check("tool_1.0.0_linux_amd64.zip", b"binary").unwrap();
//! ```

pub use self::error::{Result, VerifyError};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::manifest::{ChecksumManifest, DIGEST_LEN, Digest};
pub use self::reader::DigestReader;
pub use self::verifier::{IntegrityVerifier, ManifestSource};

mod error;
mod hasher;
mod manifest;
mod reader;
mod verifier;
