//! Whole-archive encryption: lock, unlock, and password changes.
//!
//! `lock` and `unlock` keep the canonical transform nesting intact:
//! encryption always sits inside compression, so a compressed entry is
//! inflated, its plaintext encrypted, and the ciphertext re-deflated at
//! the entry's recorded level. DEFLATE is deterministic for a fixed level,
//! which makes lock-then-unlock restore payload bytes exactly.
//!
//! Both operations are transactional: every new payload is computed before
//! any entry is touched, so a failure (most importantly a wrong password
//! during `unlock`) leaves the archive unchanged.

use crate::compress;
use crate::crypto::{KeyMaterial, Password};
use crate::format::ArchiveFlags;
use crate::hash;
use crate::{Error, Result};

use super::extract::expected_cipher_len;
use super::{Archive, Payload};

impl Archive {
    /// Encrypts every entry payload with a key derived from `password`.
    ///
    /// Generates a fresh salt and IV, stores them in the header, sets the
    /// encrypted flags, and marks the archive dirty.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyEncrypted`] when the archive is already locked and
    /// [`Error::EmptyPassword`] for an empty password.
    pub fn lock(&mut self, password: &Password) -> Result<()> {
        self.require_open()?;
        if self.header.is_encrypted() {
            return Err(Error::AlreadyEncrypted);
        }

        let material = KeyMaterial::generate(password)?;
        let cipher = material.cipher();

        let mut new_payloads = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let payload = match entry.payload() {
                Payload::Plain(data) => Payload::Encrypted(cipher.encrypt(data)),
                Payload::Compressed(stream) => {
                    let plain = compress::decompress(stream, Some(entry.original_size()))?;
                    let level = entry.compression_level().max(1);
                    Payload::EncryptedCompressed(compress::compress(&cipher.encrypt(&plain), level)?)
                }
                Payload::Encrypted(_) | Payload::EncryptedCompressed(_) => {
                    return Err(Error::invalid_entry(
                        index,
                        "entry already encrypted in unencrypted archive",
                    ));
                }
            };
            new_payloads.push(payload);
        }

        for (entry, payload) in self.entries.iter_mut().zip(new_payloads) {
            entry.replace_payload(payload);
        }
        self.header.salt = *material.salt();
        self.header.iv = *material.iv();
        self.header.flags.set(ArchiveFlags::ENCRYPTED, true);
        self.key_material = Some(material);
        self.modified = true;
        Ok(())
    }

    /// Decrypts every entry payload, removing encryption from the archive.
    ///
    /// Each recovered plaintext is checked against the entry's stored
    /// digest, so a wrong password is detected deterministically. On any
    /// failure the archive is left unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::NotEncrypted`] when the archive is not locked and
    /// [`Error::WrongPassword`] when decryption or the digest check fails.
    pub fn unlock(&mut self, password: &Password) -> Result<()> {
        self.require_open()?;
        if !self.header.is_encrypted() {
            return Err(Error::NotEncrypted);
        }

        let material = KeyMaterial::from_password(password, self.header.salt, self.header.iv)?;
        let cipher = material.cipher();

        let mut new_payloads = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let payload = match entry.payload() {
                Payload::Encrypted(ciphertext) => {
                    let plain = cipher
                        .decrypt(ciphertext)
                        .map_err(|_| Error::WrongPassword)?;
                    if !hash::equals_ct(&hash::digest(&plain), entry.digest()) {
                        return Err(Error::WrongPassword);
                    }
                    Payload::Plain(plain)
                }
                Payload::EncryptedCompressed(stream) => {
                    let ciphertext = compress::decompress(
                        stream,
                        Some(expected_cipher_len(entry.original_size())),
                    )?;
                    let plain = cipher
                        .decrypt(&ciphertext)
                        .map_err(|_| Error::WrongPassword)?;
                    if !hash::equals_ct(&hash::digest(&plain), entry.digest()) {
                        return Err(Error::WrongPassword);
                    }
                    let level = entry.compression_level().max(1);
                    Payload::Compressed(compress::compress(&plain, level)?)
                }
                Payload::Plain(_) | Payload::Compressed(_) => {
                    return Err(Error::invalid_entry(
                        index,
                        "unencrypted entry in encrypted archive",
                    ));
                }
            };
            new_payloads.push(payload);
        }

        for (entry, payload) in self.entries.iter_mut().zip(new_payloads) {
            entry.replace_payload(payload);
        }
        self.header.flags.set(ArchiveFlags::ENCRYPTED, false);
        self.header.salt = [0u8; crate::format::SALT_SIZE];
        self.header.iv = [0u8; crate::format::IV_SIZE];
        self.key_material = None;
        self.modified = true;
        Ok(())
    }

    /// Re-encrypts the archive under a new password.
    ///
    /// Behaves as `unlock(old)` followed by `lock(new)` in one
    /// transaction: a wrong old password changes nothing; if the second
    /// half fails (an empty new password) the archive is left unlocked
    /// and the error reports why.
    pub fn change_password(&mut self, old: &Password, new: &Password) -> Result<()> {
        self.require_open()?;
        if !self.header.is_encrypted() {
            return Err(Error::NotEncrypted);
        }
        // Reject an empty new password before decrypting anything so the
        // common misuse cannot strand the archive unlocked.
        if new.is_empty() {
            return Err(Error::EmptyPassword);
        }
        self.unlock(old)?;
        self.lock(new)
    }
}
