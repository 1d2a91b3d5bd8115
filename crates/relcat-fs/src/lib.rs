//! Atomic filesystem primitives.
//!
//! Content is always staged in a temporary file next to its destination and
//! moved into place in one step, so readers never observe a partial file.

mod error;

pub use error::{Error, Result};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

#[cfg(unix)]
const DEFAULT_PERMISSIONS: u32 = 0o644;

#[cfg(unix)]
const EXECUTABLE_PERMISSIONS: u32 = 0o755;

#[derive(Clone, Copy, Debug, Default)]
pub struct AtomicWriteOptions {
    permissions: Option<u32>,
    sync:        bool,
}

impl AtomicWriteOptions {
    pub fn new() -> Self { Self::default() }

    /// Unix mode bits. Ignored elsewhere.
    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    #[cfg(unix)]
    pub fn executable(self) -> Self { self.permissions(EXECUTABLE_PERMISSIONS) }

    #[cfg(not(unix))]
    pub fn executable(self) -> Self { self }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Outcome of [`create_new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Created {
    Written,
    /// Another writer got there first; its file was left untouched.
    Existing,
}

/// Writes `content` to `path`, replacing any existing file.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let staged = stage(path, content, options)?;

    staged.persist(path).map_err(|e| Error::Write {
        path:   path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Writes `content` to `path` only if nothing exists there yet.
///
/// Concurrent callers racing on the same path are safe: exactly one of them
/// sees [`Created::Written`], every other one sees [`Created::Existing`].
pub fn create_new(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<Created> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(Created::Existing);
    }

    let staged = stage(path, content, options)?;
    match staged.persist_noclobber(path) {
        Ok(_) => Ok(Created::Written),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(Created::Existing),
        Err(e) => Err(Error::Write {
            path:   path.to_path_buf(),
            source: e.error,
        }),
    }
}

pub fn atomic_read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| Error::Read {
        path:   path.to_path_buf(),
        source: e,
    })
}

/// Like [`atomic_read`], but a missing file is `Ok(None)`.
pub fn read_if_exists(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    let path = path.as_ref();
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Read {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| Error::CreateDir {
        path:   path.to_path_buf(),
        source: e,
    })
}

fn stage(path: &Path, content: &[u8], options: AtomicWriteOptions) -> Result<NamedTempFile> {
    let parent = parent_dir(path)?;
    ensure_dir(&parent)?;

    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".relcat")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(write_err)?;
    staged.write_all(content).map_err(write_err)?;

    if options.sync {
        staged.as_file().sync_all().map_err(write_err)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = options.permissions.unwrap_or(DEFAULT_PERMISSIONS);
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(mode))
            .map_err(write_err)?;
    }

    Ok(staged)
}

fn parent_dir(path: &Path) -> Result<PathBuf> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(p) => Ok(p.to_path_buf()),
        None => Err(Error::NoParent(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        atomic_write(&path, b"hello", AtomicWriteOptions::new()).unwrap();
        atomic_write(&path, b"world", AtomicWriteOptions::new()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"world");
    }

    #[test]
    fn test_create_new_keeps_first_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("entry.index");

        assert_eq!(
            create_new(&path, b"first", AtomicWriteOptions::new()).unwrap(),
            Created::Written
        );
        assert_eq!(
            create_new(&path, b"second", AtomicWriteOptions::new()).unwrap(),
            Created::Existing
        );
        assert_eq!(fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bin");
        atomic_write(&path, b"data", AtomicWriteOptions::new()).unwrap();
        create_new(&path, b"data", AtomicWriteOptions::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.bin")]);
    }

    #[test]
    fn test_read_if_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing");
        assert!(read_if_exists(&path).unwrap().is_none());
        fs::write(&path, b"x").unwrap();
        assert_eq!(read_if_exists(&path).unwrap(), Some(b"x".to_vec()));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("tool");
        atomic_write(&path, b"#!/bin/sh", AtomicWriteOptions::new().executable()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
