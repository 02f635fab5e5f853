//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use varc::{AddOptions, Archive, Password, Result};

/// Creates a temp directory and returns it with a path for an archive
/// inside it. The directory must outlive the archive file.
pub fn workspace(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

/// Builds and saves an archive from `(path, bytes)` pairs.
pub fn build_archive(
    path: &Path,
    entries: &[(&str, &[u8])],
    options: &AddOptions,
) -> Result<Archive> {
    let mut archive = Archive::new();
    archive.create(path)?;
    for (entry_path, data) in entries {
        archive.add_bytes(entry_path, data.to_vec(), options)?;
    }
    archive.save(None)?;
    Ok(archive)
}

/// Opens an archive from disk, with an optional password.
pub fn open_archive(path: &Path, password: Option<&str>) -> Result<Archive> {
    let password = password.map(Password::new);
    let mut archive = Archive::new();
    archive.open(path, password.as_ref())?;
    Ok(archive)
}

/// Checks that the archive holds exactly the given `(path, bytes)` pairs
/// in order, with matching plaintext.
pub fn assert_contents(archive: &Archive, expected: &[(&str, &[u8])]) {
    assert_eq!(archive.len(), expected.len());
    for (entry, (path, data)) in archive.entries().iter().zip(expected) {
        assert_eq!(entry.path().as_str(), *path);
        assert_eq!(entry.original_size(), data.len() as u64);
        assert_eq!(
            archive.get_entry_data(path).expect("entry data"),
            data.to_vec(),
            "payload mismatch for {path}"
        );
    }
}
