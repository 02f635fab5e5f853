//! The archive engine: lifecycle, mutation, extraction, and verification.
//!
//! [`Archive`] is the top-level state machine. A fresh value is closed;
//! [`create`](Archive::create) opens it empty and [`open`](Archive::open)
//! loads an existing file whole into memory. Mutations mark the archive
//! dirty; [`save`](Archive::save) persists atomically and clears the dirty
//! state; [`close`](Archive::close) auto-saves a dirty archive.
//!
//! One `Archive` must not be mutated from multiple threads; callers
//! serialize access externally. All operations are blocking and return when
//! complete, invoking the optional progress callback between entries.

mod add;
mod entry;
mod extract;
mod locking;
mod options;
mod query;
mod remove;
mod verify;

pub use entry::{Entry, Payload};
pub use options::{AddOptions, AddResult, ArchiveStats, ExtractOptions, ExtractResult, ListOptions};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::crypto::{KeyMaterial, Password};
use crate::format::{self, ArchiveFlags, GlobalHeader};
use crate::hash;
use crate::progress::ProgressFn;
use crate::{Error, Result};

/// A VARC archive held in memory.
///
/// # Example
///
/// ```no_run
/// use varc::{AddOptions, Archive, Result};
///
/// fn build() -> Result<()> {
///     let mut archive = Archive::new();
///     archive.create("backup.varc")?;
///     archive.add_bytes("hello.txt", b"Hello, world!\n".to_vec(), &AddOptions::default())?;
///     archive.save(None)?;
///     Ok(())
/// }
/// ```
pub struct Archive {
    path: Option<PathBuf>,
    header: GlobalHeader,
    entries: Vec<Entry>,
    modified: bool,
    is_open: bool,
    key_material: Option<KeyMaterial>,
    progress: Option<ProgressFn>,
}

impl Archive {
    /// Creates a closed archive handle.
    pub fn new() -> Self {
        Self {
            path: None,
            header: GlobalHeader::new(),
            entries: Vec::new(),
            modified: false,
            is_open: false,
            key_material: None,
            progress: None,
        }
    }

    /// Opens this handle as a fresh, empty archive at `path`.
    ///
    /// No file is written until [`save`](Archive::save).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyOpen`] if the handle already holds an open
    /// archive.
    pub fn create(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.is_open {
            return Err(Error::AlreadyOpen);
        }
        self.path = Some(path.as_ref().to_path_buf());
        self.header = GlobalHeader::new();
        self.entries.clear();
        self.key_material = None;
        self.modified = false;
        self.is_open = true;
        Ok(())
    }

    /// Reads and parses an archive file whole into memory.
    ///
    /// Encrypted archives require `password`; the password is validated
    /// against the first entry's digest. Entry payloads are kept in their
    /// stored form and are not eagerly decrypted or decompressed.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyOpen`] on handle misuse, any codec error for
    /// malformed bytes, [`Error::PasswordRequired`] when an encrypted
    /// archive is opened without a password, and [`Error::WrongPassword`]
    /// when the supplied password fails validation.
    pub fn open(&mut self, path: impl AsRef<Path>, password: Option<&Password>) -> Result<()> {
        if self.is_open {
            return Err(Error::AlreadyOpen);
        }
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let (header, records) = format::read_archive(&bytes)?;

        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            entries.push(Entry::from_record(record, index)?);
        }
        Self::check_invariants(&header, &entries)?;

        let key_material = if header.is_encrypted() {
            let password = password.ok_or(Error::PasswordRequired)?;
            let material = KeyMaterial::from_password(password, header.salt, header.iv)?;
            Self::validate_password(&material, &entries)?;
            Some(material)
        } else {
            None
        };

        self.path = Some(path.to_path_buf());
        self.header = header;
        self.entries = entries;
        self.key_material = key_material;
        self.modified = false;
        self.is_open = true;
        Ok(())
    }

    /// Persists the archive, then releases all state.
    ///
    /// A dirty archive is saved to its current path first. Closing a closed
    /// handle is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }
        if self.modified {
            self.save(None)?;
        }
        self.path = None;
        self.header = GlobalHeader::new();
        self.entries.clear();
        self.key_material = None;
        self.modified = false;
        self.is_open = false;
        Ok(())
    }

    /// Serializes the archive and writes it atomically.
    ///
    /// The bytes are written to a sibling temporary file which is then
    /// renamed over the target; the rename is the commit point. With
    /// `path = None` the archive's current path is used; with a new path
    /// the archive is re-homed there.
    pub fn save(&mut self, path: Option<&Path>) -> Result<()> {
        self.require_open()?;
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.path.clone().ok_or(Error::NotOpen)?,
        };

        self.refresh_header();
        let records: Vec<_> = self.entries.iter().map(Entry::to_record).collect();
        let bytes = format::write_archive(&self.header, &records);

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.persist(&target).map_err(|e| Error::Io(e.error))?;

        self.path = Some(target);
        self.modified = false;
        Ok(())
    }

    /// Returns true if the handle holds an open archive.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Returns true if the archive has unsaved mutations.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns true if the archive is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.header.is_encrypted()
    }

    /// Returns the archive's on-disk location, if open.
    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the global header.
    pub fn header(&self) -> &GlobalHeader {
        &self.header
    }

    /// Returns the entries in stored order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Installs a progress callback, invoked between entries during bulk
    /// operations with `(current, total, bytes_done, bytes_total, path)`.
    pub fn set_progress_callback(&mut self, callback: ProgressFn) {
        self.progress = Some(callback);
    }

    /// Removes the progress callback.
    pub fn clear_progress_callback(&mut self) {
        self.progress = None;
    }

    pub(crate) fn require_open(&self) -> Result<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    /// Recomputes the derived header fields before serialization:
    /// `file_count` mirrors the entry list and the archive `COMPRESSED`
    /// flag is set iff any entry is compressed.
    fn refresh_header(&mut self) {
        self.header.file_count = self.entries.len() as u32;
        let any_compressed = self.entries.iter().any(Entry::is_compressed);
        self.header.flags.set(ArchiveFlags::COMPRESSED, any_compressed);
    }

    /// Checks the header/entry flag invariants on a parsed archive: the
    /// archive `ENCRYPTED` flag must agree with every entry, and the
    /// archive `COMPRESSED` flag must agree with the disjunction over
    /// entries.
    fn check_invariants(header: &GlobalHeader, entries: &[Entry]) -> Result<()> {
        for (index, entry) in entries.iter().enumerate() {
            if header.is_encrypted() != entry.is_encrypted() {
                let reason = if header.is_encrypted() {
                    "archive is encrypted but entry is not"
                } else {
                    "entry is encrypted but archive is not"
                };
                return Err(Error::invalid_entry(index, reason));
            }
        }
        let any_compressed = entries.iter().any(Entry::is_compressed);
        if header.is_compressed() != any_compressed {
            return Err(Error::invalid_entry(
                0,
                "archive compressed flag disagrees with entries",
            ));
        }
        Ok(())
    }

    /// Confirms a password by reconstructing the first entry's plaintext
    /// and checking its digest. An encrypted archive with no entries
    /// accepts any password.
    fn validate_password(material: &KeyMaterial, entries: &[Entry]) -> Result<()> {
        let Some(first) = entries.first() else {
            return Ok(());
        };
        let cipher = material.cipher();
        match extract::reconstruct_payload(first, Some(&cipher)) {
            Ok(plain) if hash::equals_ct(&hash::digest(&plain), first.digest()) => Ok(()),
            Ok(_) | Err(_) => Err(Error::WrongPassword),
        }
    }

    pub(crate) fn emit_progress(
        progress: &mut Option<ProgressFn>,
        current: u64,
        total: u64,
        bytes_done: u64,
        bytes_total: u64,
        path: &str,
    ) {
        if let Some(callback) = progress.as_mut() {
            callback(current, total, bytes_done, bytes_total, path);
        }
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .field("modified", &self.modified)
            .field("is_open", &self.is_open)
            .field("encrypted", &self.header.is_encrypted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_closed() {
        let archive = Archive::new();
        assert!(!archive.is_open());
        assert!(!archive.is_modified());
        assert!(archive.is_empty());
    }

    #[test]
    fn test_operations_require_open() {
        let mut archive = Archive::new();
        assert!(matches!(archive.save(None).unwrap_err(), Error::NotOpen));
        assert!(matches!(
            archive
                .add_bytes("a", vec![], &AddOptions::default())
                .unwrap_err(),
            Error::NotOpen
        ));
    }

    #[test]
    fn test_create_twice_fails() {
        let mut archive = Archive::new();
        archive.create("/tmp/x.varc").unwrap();
        assert!(matches!(
            archive.create("/tmp/y.varc").unwrap_err(),
            Error::AlreadyOpen
        ));
    }

    #[test]
    fn test_create_is_not_dirty() {
        let mut archive = Archive::new();
        archive.create("/tmp/x.varc").unwrap();
        assert!(archive.is_open());
        assert!(!archive.is_modified());
        assert_eq!(archive.len(), 0);
        assert_eq!(archive.header().file_count, 0);
    }

    #[test]
    fn test_close_closed_handle_is_noop() {
        let mut archive = Archive::new();
        archive.close().unwrap();
        assert!(!archive.is_open());
    }

    #[test]
    fn test_open_missing_file() {
        let mut archive = Archive::new();
        assert!(matches!(
            archive.open("/nonexistent/path.varc", None).unwrap_err(),
            Error::Io(_)
        ));
    }
}
