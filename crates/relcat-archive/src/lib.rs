//! Release archive handling.
//!
//! Release archives carry one executable next to license files. This crate
//! locates that entry by name and hands back its bytes, or places it on disk
//! atomically.
//!
//! ```no_run
//! use relcat_archive::extract_entry;
//!
//! # fn main() -> relcat_archive::Result<()> {
//! let archive = std::fs::read("terraform_0.12.3_linux_amd64.zip")?;
//! let binary = extract_entry(&archive, "terraform")?;
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod format;

pub use error::{Error, Result};
pub use extract::{entry_names, extract_entry, extract_entry_to};
pub use format::{ArchiveFormat, detect_format};
