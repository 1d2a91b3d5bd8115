//! Identity types shared by discovery, lookup and verification.
//!
//! Artifacts follow the `<product>_<version>_<os>_<arch>.<ext>` naming
//! convention. [`ArtifactName`] is the single place that convention is
//! parsed, so the crawler, the manifest lookup and the verifier can not
//! drift apart.

pub use self::error::{NameError, Result};
pub use self::name::{
    ARCHIVE_EXTENSIONS, ArtifactName, MANIFEST_SUFFIX, NAME_DELIMITER, manifest_name,
    signature_name, strip_archive_extension,
};
pub use self::platform::Platform;
pub use self::release::Release;

mod error;
mod name;
mod platform;
mod release;
