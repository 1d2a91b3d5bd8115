use std::io::{Cursor, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use relcat_archive::{Error, entry_names, extract_entry, extract_entry_to};
use relcat_fs::AtomicWriteOptions;
use zip::write::SimpleFileOptions;

fn make_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

fn make_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

#[test]
fn test_zip_extracts_named_entry() {
    let data = make_zip(&[("LICENSE.txt", b"MPL"), ("terraform", b"\x7fELF binary")]);
    assert_eq!(extract_entry(&data, "terraform").unwrap(), b"\x7fELF binary");
}

#[test]
fn test_zip_missing_entry() {
    let data = make_zip(&[("README.md", b"docs")]);
    let err = extract_entry(&data, "terraform").unwrap_err();
    assert!(matches!(err, Error::EntryNotFound { ref entry } if entry == "terraform"));
}

#[test]
fn test_zip_directory_is_not_an_entry() {
    let data = make_zip(&[("terraform/", b""), ("terraform/terraform", b"bin")]);
    assert_eq!(extract_entry(&data, "terraform").unwrap(), b"bin");
    assert_eq!(entry_names(&data).unwrap(), vec!["terraform/terraform"]);
}

#[test]
fn test_tar_gz_extracts_nested_entry() {
    let data = make_tar_gz(&[("pkg/README", b"docs"), ("pkg/vault", b"vault-binary")]);
    assert_eq!(extract_entry(&data, "vault").unwrap(), b"vault-binary");
    assert_eq!(entry_names(&data).unwrap(), vec!["pkg/README", "pkg/vault"]);
}

#[test]
fn test_tar_gz_missing_entry() {
    let data = make_tar_gz(&[("consul", b"x")]);
    assert!(matches!(
        extract_entry(&data, "nomad"),
        Err(Error::EntryNotFound { .. })
    ));
}

#[test]
fn test_unrecognized_payload() {
    assert!(matches!(
        extract_entry(b"plain text", "x"),
        Err(Error::UnsupportedFormat)
    ));
}

#[test]
fn test_truncated_zip_is_corrupted() {
    let data = make_zip(&[("terraform", b"binary")]);
    let truncated = &data[..data.len() / 2];
    assert!(matches!(
        extract_entry(truncated, "terraform"),
        Err(Error::Corrupted(_))
    ));
}

#[test]
fn test_extract_entry_to_places_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("bin").join("terraform");
    let data = make_zip(&[("terraform", b"binary")]);

    extract_entry_to(&data, "terraform", &dest, AtomicWriteOptions::new().executable()).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"binary");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn test_extract_entry_to_missing_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("terraform");
    let data = make_zip(&[("other", b"x")]);

    assert!(extract_entry_to(&data, "terraform", &dest, AtomicWriteOptions::new()).is_err());
    assert!(!dest.exists());
}
