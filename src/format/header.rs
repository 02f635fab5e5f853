//! The 64-byte global archive header.

use crate::{Error, Result};

use super::{GLOBAL_HEADER_SIZE, IV_SIZE, SALT_SIZE, SIGNATURE, VERSION};

/// Archive-level flag bits.
///
/// Reserved bits are masked to zero on write and preserved on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveFlags(u16);

impl ArchiveFlags {
    /// Every entry payload is encrypted.
    pub const ENCRYPTED: u16 = 0x0001;
    /// At least one entry payload is compressed.
    pub const COMPRESSED: u16 = 0x0002;
    /// The archive carries metadata (in-memory concept; no on-disk layout
    /// is defined for the current format version).
    pub const HAS_METADATA: u16 = 0x0004;

    const KNOWN: u16 = Self::ENCRYPTED | Self::COMPRESSED | Self::HAS_METADATA;

    /// Creates flags from a raw bit pattern.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Returns the bits with all reserved bits cleared, as written to disk.
    pub fn bits_for_write(self) -> u16 {
        self.0 & Self::KNOWN
    }

    /// Returns true if the given bit is set.
    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    /// Sets or clears the given bit.
    pub fn set(&mut self, bit: u16, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// The fixed 64-byte header at the start of every VARC file.
///
/// Layout (all integers big-endian):
///
/// | offset | size | field      |
/// |--------|------|------------|
/// | 0      | 4    | signature  |
/// | 4      | 2    | version    |
/// | 6      | 2    | flags      |
/// | 8      | 4    | file_count |
/// | 12     | 32   | salt       |
/// | 44     | 16   | iv         |
/// | 60     | 4    | reserved   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalHeader {
    /// Format version word; high byte major, low byte minor.
    pub version: u16,
    /// Archive flag bits.
    pub flags: ArchiveFlags,
    /// Number of entries that follow the header.
    pub file_count: u32,
    /// PBKDF2 salt; all zero when the archive is not encrypted.
    pub salt: [u8; SALT_SIZE],
    /// AES-CBC IV; all zero when the archive is not encrypted.
    pub iv: [u8; IV_SIZE],
    /// Reserved tail of the header; zero on write, preserved on read.
    pub reserved: u32,
}

impl GlobalHeader {
    /// Creates a fresh header for an empty, unencrypted archive.
    pub fn new() -> Self {
        Self {
            version: VERSION,
            flags: ArchiveFlags::default(),
            file_count: 0,
            salt: [0u8; SALT_SIZE],
            iv: [0u8; IV_SIZE],
            reserved: 0,
        }
    }

    /// Returns true if the archive-level encrypted flag is set.
    pub fn is_encrypted(&self) -> bool {
        self.flags.contains(ArchiveFlags::ENCRYPTED)
    }

    /// Returns true if the archive-level compressed flag is set.
    pub fn is_compressed(&self) -> bool {
        self.flags.contains(ArchiveFlags::COMPRESSED)
    }

    /// Serializes the header to its fixed 64-byte representation.
    pub fn to_bytes(&self) -> [u8; GLOBAL_HEADER_SIZE] {
        let mut out = [0u8; GLOBAL_HEADER_SIZE];
        out[0..4].copy_from_slice(&SIGNATURE);
        out[4..6].copy_from_slice(&self.version.to_be_bytes());
        out[6..8].copy_from_slice(&self.flags.bits_for_write().to_be_bytes());
        out[8..12].copy_from_slice(&self.file_count.to_be_bytes());
        out[12..44].copy_from_slice(&self.salt);
        out[44..60].copy_from_slice(&self.iv);
        // reserved stays zero on write
        out
    }

    /// Parses a header from the first 64 bytes of an archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`] when fewer than 64 bytes are supplied,
    /// [`Error::InvalidSignature`] when the magic does not match, and
    /// [`Error::UnsupportedVersion`] for any version other than the
    /// published 0.3.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < GLOBAL_HEADER_SIZE {
            return Err(Error::Truncated {
                offset: bytes.len(),
                needed: GLOBAL_HEADER_SIZE - bytes.len(),
            });
        }
        if bytes[0..4] != SIGNATURE {
            return Err(Error::InvalidSignature);
        }

        let version = u16::from_be_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(Error::UnsupportedVersion { version });
        }

        let flags = ArchiveFlags::from_bits(u16::from_be_bytes([bytes[6], bytes[7]]));
        let file_count = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&bytes[12..44]);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&bytes[44..60]);

        let reserved = u32::from_be_bytes([bytes[60], bytes[61], bytes[62], bytes[63]]);

        Ok(Self {
            version,
            flags,
            file_count,
            salt,
            iv,
            reserved,
        })
    }
}

impl Default for GlobalHeader {
    fn default() -> Self {
        Self::new()
    }
}
