//! The 26-byte per-entry header.

use crate::{Error, Result};

use super::ENTRY_HEADER_SIZE;

/// Per-entry flag bits.
///
/// `COMPRESSED` and `ENCRYPTED` describe the stored payload's transform
/// chain; the remaining bits are filesystem attributes captured at add
/// time. Note that the bit assignments differ from the archive-level
/// flags: here `COMPRESSED` is bit 0 and `ENCRYPTED` bit 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryFlags(u32);

impl EntryFlags {
    /// The stored payload is a DEFLATE stream.
    pub const COMPRESSED: u32 = 0x0001;
    /// The payload (before any compression) is AES-256-CBC ciphertext.
    pub const ENCRYPTED: u32 = 0x0002;
    /// The entry represents a directory.
    pub const DIRECTORY: u32 = 0x0004;
    /// The entry represents a symbolic link.
    pub const SYMLINK: u32 = 0x0008;
    /// The source file was hidden.
    pub const HIDDEN: u32 = 0x0010;
    /// The source file was read-only.
    pub const READONLY: u32 = 0x0020;

    const KNOWN: u32 = 0x003F;

    /// Creates flags from a raw bit pattern.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns the bits with all reserved bits cleared, as written to disk.
    pub fn bits_for_write(self) -> u32 {
        self.0 & Self::KNOWN
    }

    /// Returns true if the given bit is set.
    pub fn contains(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    /// Sets or clears the given bit.
    pub fn set(&mut self, bit: u32, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// The fixed-size header preceding each entry's path and payload.
///
/// Layout (all integers big-endian):
///
/// | offset | size | field         |
/// |--------|------|---------------|
/// | 0      | 2    | path_length   |
/// | 2      | 8    | original_size |
/// | 10     | 8    | stored_size   |
/// | 18     | 4    | file_type     |
/// | 22     | 4    | flags         |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryHeader {
    /// Byte length of the UTF-8 path that follows.
    pub path_length: u16,
    /// Uncompressed, unencrypted payload length.
    pub original_size: u64,
    /// Length of the stored payload on disk after the transform chain.
    pub stored_size: u64,
    /// Semantic file type hint code.
    pub file_type: u32,
    /// Entry flag bits.
    pub flags: EntryFlags,
}

impl EntryHeader {
    /// Serializes the header to its fixed 26-byte representation.
    pub fn to_bytes(&self) -> [u8; ENTRY_HEADER_SIZE] {
        let mut out = [0u8; ENTRY_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.path_length.to_be_bytes());
        out[2..10].copy_from_slice(&self.original_size.to_be_bytes());
        out[10..18].copy_from_slice(&self.stored_size.to_be_bytes());
        out[18..22].copy_from_slice(&self.file_type.to_be_bytes());
        out[22..26].copy_from_slice(&self.flags.bits_for_write().to_be_bytes());
        out
    }

    /// Parses an entry header from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`] when fewer than 26 bytes are supplied.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ENTRY_HEADER_SIZE {
            return Err(Error::Truncated {
                offset: bytes.len(),
                needed: ENTRY_HEADER_SIZE - bytes.len(),
            });
        }
        Ok(Self {
            path_length: u16::from_be_bytes([bytes[0], bytes[1]]),
            original_size: u64::from_be_bytes(bytes[2..10].try_into().expect("8 bytes")),
            stored_size: u64::from_be_bytes(bytes[10..18].try_into().expect("8 bytes")),
            file_type: u32::from_be_bytes(bytes[18..22].try_into().expect("4 bytes")),
            flags: EntryFlags::from_bits(u32::from_be_bytes(
                bytes[22..26].try_into().expect("4 bytes"),
            )),
        })
    }

    /// Returns true if the compressed flag is set.
    pub fn is_compressed(&self) -> bool {
        self.flags.contains(EntryFlags::COMPRESSED)
    }

    /// Returns true if the encrypted flag is set.
    pub fn is_encrypted(&self) -> bool {
        self.flags.contains(EntryFlags::ENCRYPTED)
    }
}
