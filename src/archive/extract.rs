//! Extracting entry payloads back to plaintext.
//!
//! Extraction reverses the add pipeline: decompress if the entry is
//! compressed, decrypt if it is encrypted, then check the recovered
//! plaintext against the stored digest before anything reaches disk.

use std::fs;
use std::path::Path;

use crate::compress;
use crate::crypto::{Cipher, Password, BLOCK_SIZE};
use crate::hash;
use crate::matcher::wildcard_match;
use crate::{Error, Result};

use super::{Archive, Entry, ExtractOptions, ExtractResult, Payload};

/// Length of the AES-CBC ciphertext for a plaintext of `original_size`
/// bytes: the next block multiple strictly greater than the input.
pub(crate) fn expected_cipher_len(original_size: u64) -> u64 {
    (original_size / BLOCK_SIZE as u64 + 1) * BLOCK_SIZE as u64
}

/// Reverses an entry's transform chain, producing the plaintext.
///
/// The digest is not checked here; callers compare against the stored
/// digest themselves so they can choose the failure behavior.
pub(crate) fn reconstruct_payload(entry: &Entry, cipher: Option<&Cipher>) -> Result<Vec<u8>> {
    match entry.payload() {
        Payload::Plain(bytes) => Ok(bytes.clone()),
        Payload::Compressed(bytes) => compress::decompress(bytes, Some(entry.original_size())),
        Payload::Encrypted(bytes) => {
            let cipher = cipher.ok_or(Error::PasswordRequired)?;
            cipher.decrypt(bytes)
        }
        Payload::EncryptedCompressed(bytes) => {
            let cipher = cipher.ok_or(Error::PasswordRequired)?;
            let ciphertext =
                compress::decompress(bytes, Some(expected_cipher_len(entry.original_size())))?;
            cipher.decrypt(&ciphertext)
        }
    }
}

impl Archive {
    /// Returns a cipher for payload transforms, deriving and caching key
    /// material from `password` when none is held yet. Returns `None` for
    /// unencrypted archives.
    pub(crate) fn cipher_for(&mut self, password: Option<&Password>) -> Result<Option<Cipher>> {
        if !self.header.is_encrypted() {
            return Ok(None);
        }
        if self.key_material.is_none() {
            let password = password.ok_or(Error::PasswordRequired)?;
            self.key_material = Some(crate::crypto::KeyMaterial::from_password(
                password,
                self.header.salt,
                self.header.iv,
            )?);
        }
        Ok(self.key_material.as_ref().map(|m| m.cipher()))
    }

    /// Non-caching variant of [`cipher_for`](Self::cipher_for) for `&self`
    /// operations.
    pub(crate) fn cipher_readonly(&self, password: Option<&Password>) -> Result<Option<Cipher>> {
        if !self.header.is_encrypted() {
            return Ok(None);
        }
        if let Some(material) = &self.key_material {
            return Ok(Some(material.cipher()));
        }
        let password = password.ok_or(Error::PasswordRequired)?;
        Ok(Some(Cipher::from_password(
            password,
            &self.header.salt,
            self.header.iv,
        )?))
    }

    /// Returns the verified plaintext of the entry at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown paths and
    /// [`Error::ChecksumMismatch`] when the recovered plaintext does not
    /// match the stored digest.
    pub fn get_entry_data(&self, path: &str) -> Result<Vec<u8>> {
        self.require_open()?;
        let entry = self.find_entry(path).ok_or_else(|| Error::NotFound {
            path: path.to_string(),
        })?;
        let cipher = self.cipher_readonly(None)?;
        let plain = reconstruct_payload(entry, cipher.as_ref())?;
        if !hash::equals_ct(&hash::digest(&plain), entry.digest()) {
            return Err(Error::ChecksumMismatch {
                path: path.to_string(),
            });
        }
        Ok(plain)
    }

    /// Extracts one entry to `output_path`, creating parent directories.
    ///
    /// The output file is written without fsync; durability is the
    /// caller's concern.
    pub fn extract_one(
        &mut self,
        path: &str,
        output_path: impl AsRef<Path>,
        password: Option<&Password>,
    ) -> Result<()> {
        self.require_open()?;
        let cipher = self.cipher_for(password)?;
        let entry = self.find_entry(path).ok_or_else(|| Error::NotFound {
            path: path.to_string(),
        })?;

        let plain = reconstruct_payload(entry, cipher.as_ref())?;
        if !hash::equals_ct(&hash::digest(&plain), entry.digest()) {
            return Err(Error::ChecksumMismatch {
                path: path.to_string(),
            });
        }

        let output_path = output_path.as_ref();
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, plain)?;
        Ok(())
    }

    /// Extracts every entry (honoring the substring filter) into
    /// `output_dir` in stored order.
    ///
    /// Existing files are skipped unless `options.overwrite` is set, but
    /// still count as processed. Per-file write errors are logged and
    /// collected in the result; corruption and password errors abort.
    pub fn extract_all(
        &mut self,
        output_dir: impl AsRef<Path>,
        password: Option<&Password>,
        options: &ExtractOptions,
    ) -> Result<ExtractResult> {
        self.require_open()?;
        let selected: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                options.filter.is_empty()
                    || options
                        .filter
                        .iter()
                        .any(|needle| entry.path().as_str().contains(needle.as_str()))
            })
            .map(|(index, _)| index)
            .collect();
        self.extract_selected(&selected, output_dir.as_ref(), password, options)
    }

    /// Extracts every entry whose path matches the wildcard pattern.
    pub fn extract_pattern(
        &mut self,
        pattern: &str,
        output_dir: impl AsRef<Path>,
        password: Option<&Password>,
    ) -> Result<ExtractResult> {
        self.require_open()?;
        let selected: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| wildcard_match(entry.path().as_str(), pattern))
            .map(|(index, _)| index)
            .collect();
        self.extract_selected(
            &selected,
            output_dir.as_ref(),
            password,
            &ExtractOptions::default(),
        )
    }

    fn extract_selected(
        &mut self,
        selected: &[usize],
        output_dir: &Path,
        password: Option<&Password>,
        options: &ExtractOptions,
    ) -> Result<ExtractResult> {
        let cipher = self.cipher_for(password)?;
        fs::create_dir_all(output_dir)?;

        let total_files = selected.len() as u64;
        let bytes_total: u64 = selected
            .iter()
            .map(|&index| self.entries[index].original_size())
            .sum();

        let mut result = ExtractResult::default();
        for (position, &index) in selected.iter().enumerate() {
            let entry = &self.entries[index];
            let entry_path = entry.path().as_str().to_string();
            let output_path = output_dir.join(&entry_path);

            if !options.overwrite && output_path.exists() {
                result.files_processed += 1;
                result.bytes_processed += entry.original_size();
                Self::emit_progress(
                    &mut self.progress,
                    position as u64 + 1,
                    total_files,
                    result.bytes_processed,
                    bytes_total,
                    &entry_path,
                );
                continue;
            }

            let plain = reconstruct_payload(entry, cipher.as_ref())?;
            if !hash::equals_ct(&hash::digest(&plain), entry.digest()) {
                return Err(Error::ChecksumMismatch { path: entry_path });
            }

            let written = (|| -> std::io::Result<()> {
                if let Some(parent) = output_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::write(&output_path, &plain)
            })();

            match written {
                Ok(()) => {
                    result.files_processed += 1;
                    result.bytes_processed += entry.original_size();
                }
                Err(e) => {
                    log::warn!("failed to write '{}': {e}", output_path.display());
                    result.failures.push(entry_path.clone());
                }
            }

            Self::emit_progress(
                &mut self.progress,
                position as u64 + 1,
                total_files,
                result.bytes_processed,
                bytes_total,
                &entry_path,
            );
        }
        Ok(result)
    }
}
