//! In-memory archive entries.
//!
//! An [`Entry`] pairs a validated path with a [`Payload`] that tracks which
//! transforms the stored bytes have undergone. The on-disk `COMPRESSED` and
//! `ENCRYPTED` flags are derived from the payload variant at serialize
//! time, so the flags can never disagree with the bytes.

use std::time::SystemTime;

use crate::compress;
use crate::entry_path::EntryPath;
use crate::format::{detect, EntryFlags, EntryHeader, FileType, Record};
use crate::hash::{self, Digest};
use crate::{Error, Result};

/// The stored bytes of an entry, tagged by the transforms applied to them.
///
/// The canonical transform order is digest, then encrypt, then compress, so
/// [`Payload::EncryptedCompressed`] holds `deflate(aes_cbc(plain))` and
/// extraction always decompresses before it decrypts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The original plaintext, stored verbatim.
    Plain(Vec<u8>),
    /// A DEFLATE stream of the plaintext.
    Compressed(Vec<u8>),
    /// AES-256-CBC ciphertext of the plaintext.
    Encrypted(Vec<u8>),
    /// A DEFLATE stream of the ciphertext.
    EncryptedCompressed(Vec<u8>),
}

impl Payload {
    /// Returns the stored bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Payload::Plain(b)
            | Payload::Compressed(b)
            | Payload::Encrypted(b)
            | Payload::EncryptedCompressed(b) => b,
        }
    }

    /// Returns the on-disk length of the stored bytes.
    pub fn stored_size(&self) -> u64 {
        self.bytes().len() as u64
    }

    /// Returns true if the stored bytes are a DEFLATE stream.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Payload::Compressed(_) | Payload::EncryptedCompressed(_))
    }

    /// Returns true if the payload is ciphertext under any compression.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Payload::Encrypted(_) | Payload::EncryptedCompressed(_))
    }

    /// Returns the transform flag bits this payload contributes.
    pub fn flag_bits(&self) -> u32 {
        let mut bits = 0;
        if self.is_compressed() {
            bits |= EntryFlags::COMPRESSED;
        }
        if self.is_encrypted() {
            bits |= EntryFlags::ENCRYPTED;
        }
        bits
    }

    /// Reconstructs the payload variant from on-disk flags.
    pub(crate) fn from_flags(flags: EntryFlags, bytes: Vec<u8>) -> Self {
        match (
            flags.contains(EntryFlags::ENCRYPTED),
            flags.contains(EntryFlags::COMPRESSED),
        ) {
            (false, false) => Payload::Plain(bytes),
            (false, true) => Payload::Compressed(bytes),
            (true, false) => Payload::Encrypted(bytes),
            (true, true) => Payload::EncryptedCompressed(bytes),
        }
    }
}

/// One logical file stored in an archive.
///
/// The digest is fixed when the entry is created from plaintext and never
/// changes afterwards; transforms only replace the stored payload.
#[derive(Debug, Clone)]
pub struct Entry {
    path: EntryPath,
    payload: Payload,
    original_size: u64,
    file_type: u32,
    attr_flags: EntryFlags,
    digest: Digest,
    created: SystemTime,
    modified: SystemTime,
    compression_level: u32,
}

impl Entry {
    /// Creates an entry from caller-supplied plaintext.
    ///
    /// The digest and file type hint are computed here, and both timestamps
    /// are set to the current time.
    pub fn from_plaintext(path: EntryPath, data: Vec<u8>) -> Self {
        let now = SystemTime::now();
        Self {
            digest: hash::digest(&data),
            original_size: data.len() as u64,
            file_type: detect::detect(&data).code(),
            payload: Payload::Plain(data),
            path,
            attr_flags: EntryFlags::default(),
            created: now,
            modified: now,
            compression_level: compress::DEFAULT_LEVEL,
        }
    }

    /// Rebuilds an entry from a parsed on-disk record.
    pub(crate) fn from_record(record: Record, index: usize) -> Result<Self> {
        let path = EntryPath::new(&record.path)?;
        let payload = Payload::from_flags(record.header.flags, record.payload);

        // A plain payload must be exactly the original bytes.
        if let Payload::Plain(bytes) = &payload {
            if bytes.len() as u64 != record.header.original_size {
                return Err(Error::invalid_entry(
                    index,
                    format!(
                        "plain payload is {} bytes but original size is {}",
                        bytes.len(),
                        record.header.original_size
                    ),
                ));
            }
        }
        if let Payload::Encrypted(bytes) = &payload {
            if bytes.is_empty() || bytes.len() % 16 != 0 {
                return Err(Error::invalid_entry(
                    index,
                    "encrypted payload is not a whole number of cipher blocks",
                ));
            }
        }

        let now = SystemTime::now();
        Ok(Self {
            path,
            payload,
            original_size: record.header.original_size,
            file_type: record.header.file_type,
            attr_flags: EntryFlags::from_bits(
                record.header.flags.bits()
                    & !(EntryFlags::COMPRESSED | EntryFlags::ENCRYPTED),
            ),
            digest: record.digest,
            created: now,
            modified: now,
            compression_level: compress::DEFAULT_LEVEL,
        })
    }

    /// Serializes the entry to its on-disk record form.
    pub(crate) fn to_record(&self) -> Record {
        Record {
            header: EntryHeader {
                path_length: self.path.as_bytes().len() as u16,
                original_size: self.original_size,
                stored_size: self.payload.stored_size(),
                file_type: self.file_type,
                flags: self.flags(),
            },
            path: self.path.as_str().to_string(),
            payload: self.payload.bytes().to_vec(),
            digest: self.digest,
        }
    }

    /// Returns the archive path.
    pub fn path(&self) -> &EntryPath {
        &self.path
    }

    /// Returns the stored payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Replaces the stored payload, returning the previous one.
    pub(crate) fn replace_payload(&mut self, payload: Payload) -> Payload {
        std::mem::replace(&mut self.payload, payload)
    }

    /// Returns the uncompressed, unencrypted payload length.
    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    /// Returns the on-disk payload length.
    pub fn stored_size(&self) -> u64 {
        self.payload.stored_size()
    }

    /// Returns the complete flag bits: filesystem attributes plus the
    /// transform bits derived from the payload variant.
    pub fn flags(&self) -> EntryFlags {
        EntryFlags::from_bits(self.attr_flags.bits() | self.payload.flag_bits())
    }

    /// Returns the SHA-256 of the original plaintext.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Returns the file type hint.
    pub fn file_type(&self) -> FileType {
        FileType::from_code(self.file_type)
    }

    /// Returns the raw on-disk file type code.
    pub fn file_type_code(&self) -> u32 {
        self.file_type
    }

    /// Returns true if the stored payload is compressed.
    pub fn is_compressed(&self) -> bool {
        self.payload.is_compressed()
    }

    /// Returns true if the stored payload is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.payload.is_encrypted()
    }

    /// Returns true if the entry carries the directory attribute.
    pub fn is_directory(&self) -> bool {
        self.attr_flags.contains(EntryFlags::DIRECTORY)
    }

    /// Returns the creation time recorded for this entry.
    pub fn created(&self) -> SystemTime {
        self.created
    }

    /// Returns the modification time recorded for this entry.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub(crate) fn set_created(&mut self, time: SystemTime) {
        self.created = time;
    }

    pub(crate) fn set_modified(&mut self, time: SystemTime) {
        self.modified = time;
    }

    pub(crate) fn set_attr(&mut self, bit: u32, value: bool) {
        self.attr_flags.set(bit, value);
    }

    /// Returns the DEFLATE level used for this entry's payload.
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    pub(crate) fn set_compression_level(&mut self, level: u32) {
        self.compression_level = level;
    }

    /// Returns the stored-to-original size ratio as a percentage.
    ///
    /// 100.0 means no saving; smaller is better. Empty entries report 0.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            100.0 * self.stored_size() as f64 / self.original_size as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::EntryFlags;

    fn entry(data: &[u8]) -> Entry {
        Entry::from_plaintext(EntryPath::new("test.bin").unwrap(), data.to_vec())
    }

    #[test]
    fn test_from_plaintext_fixes_digest_and_sizes() {
        let e = entry(b"Hello, world!\n");
        assert_eq!(e.original_size(), 14);
        assert_eq!(e.stored_size(), 14);
        assert!(hash::to_hex(e.digest()).starts_with("d9014c46"));
        assert_eq!(e.file_type(), FileType::Text);
        assert!(!e.is_compressed());
        assert!(!e.is_encrypted());
    }

    #[test]
    fn test_payload_flag_derivation() {
        assert_eq!(Payload::Plain(vec![]).flag_bits(), 0);
        assert_eq!(
            Payload::Compressed(vec![]).flag_bits(),
            EntryFlags::COMPRESSED
        );
        assert_eq!(Payload::Encrypted(vec![]).flag_bits(), EntryFlags::ENCRYPTED);
        assert_eq!(
            Payload::EncryptedCompressed(vec![]).flag_bits(),
            EntryFlags::COMPRESSED | EntryFlags::ENCRYPTED
        );
    }

    #[test]
    fn test_payload_from_flags_roundtrip() {
        for bits in [
            0,
            EntryFlags::COMPRESSED,
            EntryFlags::ENCRYPTED,
            EntryFlags::COMPRESSED | EntryFlags::ENCRYPTED,
        ] {
            let payload = Payload::from_flags(EntryFlags::from_bits(bits), vec![1, 2, 3]);
            assert_eq!(payload.flag_bits(), bits);
        }
    }

    #[test]
    fn test_record_roundtrip_preserves_identity() {
        let mut e = entry(b"some payload");
        e.set_attr(EntryFlags::READONLY, true);
        let record = e.to_record();
        assert_eq!(record.header.path_length, 8);
        assert_eq!(record.header.original_size, 12);

        let back = Entry::from_record(record, 0).unwrap();
        assert_eq!(back.path().as_str(), "test.bin");
        assert_eq!(back.digest(), e.digest());
        assert_eq!(back.flags().bits(), e.flags().bits());
        assert_eq!(back.original_size(), e.original_size());
    }

    #[test]
    fn test_from_record_rejects_plain_size_mismatch() {
        let mut record = entry(b"abcd").to_record();
        record.header.original_size = 99;
        assert!(matches!(
            Entry::from_record(record, 3).unwrap_err(),
            Error::InvalidEntry { index: 3, .. }
        ));
    }

    #[test]
    fn test_from_record_rejects_unaligned_ciphertext() {
        let mut record = entry(b"abcd").to_record();
        record.header.flags = EntryFlags::from_bits(EntryFlags::ENCRYPTED);
        // 4 payload bytes cannot be AES ciphertext.
        assert!(matches!(
            Entry::from_record(record, 0).unwrap_err(),
            Error::InvalidEntry { .. }
        ));
    }

    #[test]
    fn test_replace_payload_updates_flags() {
        let mut e = entry(b"data");
        e.replace_payload(Payload::Encrypted(vec![0u8; 16]));
        assert!(e.is_encrypted());
        assert_eq!(e.stored_size(), 16);
        // The digest is untouched by payload replacement.
        assert_eq!(e.digest(), &hash::digest(b"data"));
    }

    #[test]
    fn test_compression_ratio() {
        let mut e = entry(&[0x41u8; 1000]);
        assert_eq!(e.compression_ratio(), 100.0);
        e.replace_payload(Payload::Compressed(vec![0u8; 100]));
        assert!((e.compression_ratio() - 10.0).abs() < f64::EPSILON);

        let empty = entry(b"");
        assert_eq!(empty.compression_ratio(), 0.0);
    }
}
