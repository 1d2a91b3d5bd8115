//! Operating system and architecture naming.

use serde::{Deserialize, Serialize};

/// An (os, arch) pair in the vendor's naming (`darwin`/`amd64`, `linux`/`386`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os:   String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl AsRef<str>, arch: impl AsRef<str>) -> Self {
        Self {
            os:   os.as_ref().trim().to_ascii_lowercase(),
            arch: arch.as_ref().trim().to_ascii_lowercase(),
        }
    }

    /// Platform of the running process.
    pub fn local() -> Self {
        Self::new(vendor_os(std::env::consts::OS), vendor_arch(std::env::consts::ARCH))
    }

    pub fn is_windows(&self) -> bool { self.os == "windows" }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn vendor_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        "illumos" => "solaris",
        other => other,
    }
}

fn vendor_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        other => other,
    }
}
