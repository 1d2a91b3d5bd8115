use std::path::Path;

use relcat_fs::AtomicWriteOptions;
use tracing::debug;

use crate::{ArchiveFormat, Error, Result, detect_format};

/// An entry matches by full path or by its final path component.
fn matches(path: &str, entry: &str) -> bool {
    path == entry || Path::new(path).file_name().and_then(|n| n.to_str()) == Some(entry)
}

/// Returns the content of the first regular file named `entry`.
pub fn extract_entry(data: &[u8], entry: &str) -> Result<Vec<u8>> {
    let found = match detect_format(data).ok_or(Error::UnsupportedFormat)? {
        ArchiveFormat::Zip => zip_impl::find(data, entry)?,
        ArchiveFormat::TarGz => tar_impl::find(data, entry)?,
    };

    let content = found.ok_or_else(|| Error::EntryNotFound {
        entry: entry.to_string(),
    })?;
    debug!(entry, bytes = content.len(), "extracted archive entry");
    Ok(content)
}

/// Extracts `entry` and writes it to `dest` in one atomic step.
pub fn extract_entry_to(
    data: &[u8],
    entry: &str,
    dest: &Path,
    options: AtomicWriteOptions,
) -> Result<()> {
    let content = extract_entry(data, entry)?;
    relcat_fs::atomic_write(dest, &content, options)?;
    Ok(())
}

/// Paths of all regular files in the archive, in archive order.
pub fn entry_names(data: &[u8]) -> Result<Vec<String>> {
    match detect_format(data).ok_or(Error::UnsupportedFormat)? {
        ArchiveFormat::Zip => zip_impl::names(data),
        ArchiveFormat::TarGz => tar_impl::names(data),
    }
}

#[cfg(feature = "zip")]
mod zip_impl {
    use std::io::{Cursor, Read};

    use super::matches;
    use crate::{Error, Result};

    fn open(data: &[u8]) -> Result<zip::ZipArchive<Cursor<&[u8]>>> {
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| Error::Corrupted(e.to_string()))
    }

    pub(super) fn find(data: &[u8], entry: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = open(data)?;
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::Corrupted(e.to_string()))?;
            if file.is_dir() || !matches(file.name(), entry) {
                continue;
            }

            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)
                .map_err(|e| Error::Corrupted(e.to_string()))?;
            return Ok(Some(content));
        }
        Ok(None)
    }

    pub(super) fn names(data: &[u8]) -> Result<Vec<String>> {
        let mut archive = open(data)?;
        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index(index)
                .map_err(|e| Error::Corrupted(e.to_string()))?;
            if !file.is_dir() {
                names.push(file.name().to_string());
            }
        }
        Ok(names)
    }
}

#[cfg(not(feature = "zip"))]
mod zip_impl {
    use crate::{Error, Result};

    pub(super) fn find(_: &[u8], _: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::UnsupportedFormat)
    }

    pub(super) fn names(_: &[u8]) -> Result<Vec<String>> { Err(Error::UnsupportedFormat) }
}

#[cfg(feature = "tar")]
mod tar_impl {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::matches;
    use crate::{Error, Result};

    fn corrupted(e: std::io::Error) -> Error { Error::Corrupted(e.to_string()) }

    /// Visits regular files until `visit` returns `Some`.
    fn scan<T>(
        data: &[u8],
        mut visit: impl FnMut(&str, &mut dyn Read) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let mut archive = tar::Archive::new(GzDecoder::new(data));
        for entry in archive.entries().map_err(corrupted)? {
            let mut entry = entry.map_err(corrupted)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = entry.path().map_err(corrupted)?.to_string_lossy().into_owned();
            if let Some(found) = visit(&path, &mut entry)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub(super) fn find(data: &[u8], entry: &str) -> Result<Option<Vec<u8>>> {
        scan(data, |path, reader| {
            if !matches(path, entry) {
                return Ok(None);
            }
            let mut content = Vec::new();
            reader.read_to_end(&mut content).map_err(corrupted)?;
            Ok(Some(content))
        })
    }

    pub(super) fn names(data: &[u8]) -> Result<Vec<String>> {
        let mut names = Vec::new();
        scan::<()>(data, |path, _| {
            names.push(path.to_string());
            Ok(None)
        })?;
        Ok(names)
    }
}

#[cfg(not(feature = "tar"))]
mod tar_impl {
    use crate::{Error, Result};

    pub(super) fn find(_: &[u8], _: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::UnsupportedFormat)
    }

    pub(super) fn names(_: &[u8]) -> Result<Vec<String>> { Err(Error::UnsupportedFormat) }
}
