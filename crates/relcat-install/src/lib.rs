//! The download path: resolve a build, download it, verify it against its
//! release's checksum manifest, and only then extract and place it.

mod error;
mod installer;

pub use error::{InstallError, Result};
pub use installer::{Installed, Installer, binary_name};
