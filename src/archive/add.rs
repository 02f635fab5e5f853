//! Adding entries to an archive.
//!
//! The per-entry pipeline runs in the documented order: the digest of the
//! original plaintext is fixed first, then the payload is encrypted if
//! requested, then compressed if requested. The stored bytes of a doubly
//! transformed entry are therefore `deflate(aes_cbc(plain))`.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::compress;
use crate::crypto::Password;
use crate::entry_path::EntryPath;
use crate::format::EntryFlags;
use crate::{Error, Result};

use super::{AddOptions, AddResult, Archive, Entry, Payload};

/// Converts a filesystem path to an archive path: forward slashes, no
/// root, no `.` segments. `..` segments are rejected.
fn archive_path_for(path: &Path) -> Result<String> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(os) => parts.push(
                os.to_str()
                    .ok_or_else(|| Error::InvalidPath("path is not valid UTF-8".into()))?,
            ),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(Error::InvalidPath("'..' segment not allowed".into()));
            }
        }
    }
    if parts.is_empty() {
        return Err(Error::InvalidPath("empty path".into()));
    }
    Ok(parts.join("/"))
}

fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

impl Archive {
    /// Adds caller-supplied bytes under the given archive path.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicatePath`] when an entry with the same path exists,
    /// [`Error::PathTooLong`] / [`Error::InvalidPath`] for bad paths, and
    /// [`Error::PasswordRequired`] when encryption is requested without a
    /// password.
    pub fn add_bytes(&mut self, path: &str, data: Vec<u8>, options: &AddOptions) -> Result<()> {
        self.require_open()?;
        let entry = Entry::from_plaintext(EntryPath::new(path)?, data);
        self.add_transformed(entry, options)
    }

    /// Adds a prebuilt plaintext entry, applying the transform pipeline.
    ///
    /// The entry must carry a [`Payload::Plain`] payload; entries whose
    /// payloads were already transformed cannot be re-added.
    pub fn add_entry(&mut self, entry: Entry, options: &AddOptions) -> Result<()> {
        self.require_open()?;
        if !matches!(entry.payload(), Payload::Plain(_)) {
            return Err(Error::invalid_entry(
                self.entries.len(),
                "added entries must carry a plaintext payload",
            ));
        }
        self.add_transformed(entry, options)
    }

    /// Reads a file and adds it under its own (relativized) path.
    pub fn add_path(&mut self, fs_path: impl AsRef<Path>, options: &AddOptions) -> Result<()> {
        self.require_open()?;
        let fs_path = fs_path.as_ref();
        let archive_path = archive_path_for(fs_path)?;
        self.add_path_as(fs_path, &archive_path, options)
    }

    /// Recursively adds every regular file under `root`.
    ///
    /// Archive paths are relative to `root`'s parent, so the root
    /// directory's own name is preserved in the archive. Directory entries
    /// themselves are not stored; extraction recreates them from entry
    /// paths. Files whose names start with `.` are skipped unless
    /// `options.include_hidden` is set.
    ///
    /// Files colliding with existing paths are skipped and reported in the
    /// result; all other errors abort the operation.
    pub fn add_directory(
        &mut self,
        root: impl AsRef<Path>,
        options: &AddOptions,
    ) -> Result<AddResult> {
        self.require_open()?;
        let root = root.as_ref();
        let base = root.parent().unwrap_or_else(|| Path::new(""));

        let mut files: Vec<(PathBuf, String, u64)> = Vec::new();
        for walked in WalkDir::new(root).sort_by_file_name() {
            let walked = walked.map_err(|e| {
                Error::Io(e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected")))
            })?;
            if !walked.file_type().is_file() {
                continue;
            }
            if !options.include_hidden && is_hidden_name(walked.file_name()) {
                continue;
            }
            let relative = walked.path().strip_prefix(base).unwrap_or(walked.path());
            let archive_path = archive_path_for(relative)?;
            let size = walked.metadata().map(|m| m.len()).unwrap_or(0);
            files.push((walked.into_path(), archive_path, size));
        }

        let total_files = files.len() as u64;
        let total_bytes: u64 = files.iter().map(|(_, _, size)| size).sum();
        let mut result = AddResult::default();
        let mut bytes_done = 0u64;

        for (index, (fs_path, archive_path, size)) in files.iter().enumerate() {
            match self.add_path_as(fs_path, archive_path, options) {
                Ok(()) => {
                    result.files_added += 1;
                    result.bytes_added += size;
                }
                Err(Error::DuplicatePath { path }) => {
                    log::warn!("skipping duplicate path '{path}'");
                    result.skipped.push(path);
                }
                Err(e) => return Err(e),
            }
            bytes_done += size;
            Self::emit_progress(
                &mut self.progress,
                index as u64 + 1,
                total_files,
                bytes_done,
                total_bytes,
                archive_path,
            );
        }
        Ok(result)
    }

    /// Adds a mixed list of files and directories, expanding directories
    /// recursively. This is the bulk entry point used by the CLI.
    pub fn add_paths(&mut self, inputs: &[PathBuf], options: &AddOptions) -> Result<AddResult> {
        self.require_open()?;
        let mut result = AddResult::default();
        for input in inputs {
            if input.is_dir() {
                let sub = self.add_directory(input, options)?;
                result.merge(sub);
            } else {
                let size = std::fs::metadata(input)?.len();
                match self.add_path(input, options) {
                    Ok(()) => {
                        result.files_added += 1;
                        result.bytes_added += size;
                    }
                    Err(Error::DuplicatePath { path }) => {
                        log::warn!("skipping duplicate path '{path}'");
                        result.skipped.push(path);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn add_path_as(
        &mut self,
        fs_path: &Path,
        archive_path: &str,
        options: &AddOptions,
    ) -> Result<()> {
        let data = std::fs::read(fs_path)?;
        let metadata = std::fs::metadata(fs_path)?;

        let mut entry = Entry::from_plaintext(EntryPath::new(archive_path)?, data);
        if let Ok(modified) = metadata.modified() {
            entry.set_modified(modified);
        }
        if let Ok(created) = metadata.created() {
            entry.set_created(created);
        }
        if metadata.permissions().readonly() {
            entry.set_attr(EntryFlags::READONLY, true);
        }
        if fs_path.file_name().is_some_and(is_hidden_name) {
            entry.set_attr(EntryFlags::HIDDEN, true);
        }
        self.add_transformed(entry, options)
    }

    /// Applies the transform pipeline to a plaintext entry and appends it.
    fn add_transformed(&mut self, mut entry: Entry, options: &AddOptions) -> Result<()> {
        if self
            .entries
            .iter()
            .any(|e| e.path().as_bytes() == entry.path().as_bytes())
        {
            return Err(Error::DuplicatePath {
                path: entry.path().as_str().to_string(),
            });
        }

        let encrypt = options.encrypt || self.header.is_encrypted();
        if encrypt {
            self.ensure_encryption(options.password.as_ref())?;
        }

        let Payload::Plain(mut bytes) = entry.replace_payload(Payload::Plain(Vec::new())) else {
            return Err(Error::invalid_entry(
                self.entries.len(),
                "added entries must carry a plaintext payload",
            ));
        };

        if encrypt {
            let cipher = self
                .key_material
                .as_ref()
                .expect("encryption initialized above")
                .cipher();
            bytes = cipher.encrypt(&bytes);
        }

        let level = options.level.min(compress::MAX_LEVEL);
        let compressed = options.compress && level > 0 && !bytes.is_empty();
        if compressed {
            bytes = compress::compress(&bytes, level)?;
        }

        entry.replace_payload(match (encrypt, compressed) {
            (false, false) => Payload::Plain(bytes),
            (false, true) => Payload::Compressed(bytes),
            (true, false) => Payload::Encrypted(bytes),
            (true, true) => Payload::EncryptedCompressed(bytes),
        });
        entry.set_compression_level(if compressed { level } else { 0 });

        if compressed {
            self.header
                .flags
                .set(crate::format::ArchiveFlags::COMPRESSED, true);
        }
        self.entries.push(entry);
        self.modified = true;
        Ok(())
    }

    /// Makes sure the archive can encrypt payloads.
    ///
    /// If the archive is not yet encrypted this behaves like an implicit
    /// [`lock`](Archive::lock): fresh salt and IV are generated and any
    /// existing plaintext entries are encrypted with the new key, keeping
    /// the header-flag/entry-flag invariant intact.
    fn ensure_encryption(&mut self, password: Option<&Password>) -> Result<()> {
        if self.header.is_encrypted() {
            if self.key_material.is_some() {
                return Ok(());
            }
            // An encrypted archive is only ever open with validated key
            // material; reaching here means the caller bypassed open().
            let password = password.ok_or(Error::PasswordRequired)?;
            self.key_material = Some(crate::crypto::KeyMaterial::from_password(
                password,
                self.header.salt,
                self.header.iv,
            )?);
            return Ok(());
        }
        let password = password.ok_or(Error::PasswordRequired)?;
        self.lock(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_path_for_relative() {
        assert_eq!(archive_path_for(Path::new("a/b/c.txt")).unwrap(), "a/b/c.txt");
        assert_eq!(archive_path_for(Path::new("./a/b.txt")).unwrap(), "a/b.txt");
    }

    #[test]
    fn test_archive_path_for_absolute_is_relativized() {
        assert_eq!(archive_path_for(Path::new("/tmp/x.txt")).unwrap(), "tmp/x.txt");
    }

    #[test]
    fn test_archive_path_for_rejects_parent() {
        assert!(matches!(
            archive_path_for(Path::new("../x.txt")).unwrap_err(),
            Error::InvalidPath(_)
        ));
    }

    #[test]
    fn test_archive_path_for_rejects_empty() {
        assert!(archive_path_for(Path::new("")).is_err());
        assert!(archive_path_for(Path::new("/")).is_err());
    }

    #[test]
    fn test_is_hidden_name() {
        assert!(is_hidden_name(std::ffi::OsStr::new(".bashrc")));
        assert!(!is_hidden_name(std::ffi::OsStr::new("visible.txt")));
    }

    #[test]
    fn test_add_bytes_duplicate() {
        let mut archive = Archive::new();
        archive.create("/tmp/dup.varc").unwrap();
        let opts = AddOptions::default();
        archive.add_bytes("a.txt", b"one".to_vec(), &opts).unwrap();
        let err = archive.add_bytes("a.txt", b"two".to_vec(), &opts).unwrap_err();
        assert!(matches!(err, Error::DuplicatePath { .. }));
        // The archive is unchanged by the failed add.
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get_entry_data("a.txt").unwrap(), b"one");
    }

    #[test]
    fn test_add_bytes_encrypt_without_password() {
        let mut archive = Archive::new();
        archive.create("/tmp/nopw.varc").unwrap();
        let mut opts = AddOptions::default();
        opts.encrypt = true;
        let err = archive.add_bytes("s.txt", b"secret".to_vec(), &opts).unwrap_err();
        assert!(matches!(err, Error::PasswordRequired));
    }

    #[test]
    fn test_add_bytes_level_zero_stores_plain() {
        let mut archive = Archive::new();
        archive.create("/tmp/store.varc").unwrap();
        let opts = AddOptions::new().level(0);
        archive.add_bytes("x.bin", vec![7u8; 256], &opts).unwrap();
        let entry = &archive.entries()[0];
        assert!(!entry.is_compressed());
        assert_eq!(entry.stored_size(), 256);
        assert!(!archive.header().is_compressed());
    }

    #[test]
    fn test_add_empty_payload_never_compressed() {
        let mut archive = Archive::new();
        archive.create("/tmp/empty.varc").unwrap();
        archive
            .add_bytes("empty", Vec::new(), &AddOptions::default())
            .unwrap();
        let entry = &archive.entries()[0];
        assert!(!entry.is_compressed());
        assert_eq!(entry.stored_size(), 0);
        assert_eq!(entry.original_size(), 0);
    }
}
