//! Error types for VARC archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when working with VARC archives, along with a convenient
//! [`Result<T>`] type alias.
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use varc::{Archive, Result};
//!
//! fn extract_archive(path: &str, dest: &str) -> Result<()> {
//!     let mut archive = Archive::new();
//!     archive.open(path, None)?;
//!     archive.extract_all(dest, None, &Default::default())?;
//!     Ok(())
//! }
//! ```

use std::io;

/// Why a DEFLATE stream failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecompressErrorKind {
    /// The stream contains invalid DEFLATE data.
    Corrupted,
    /// The stream ended before the final block.
    Truncated,
    /// The stream decoded cleanly but to an unexpected length.
    SizeMismatch,
}

impl std::fmt::Display for DecompressErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "corrupted stream"),
            Self::Truncated => write!(f, "truncated stream"),
            Self::SizeMismatch => write!(f, "decoded size mismatch"),
        }
    }
}

/// The main error type for VARC archive operations.
///
/// Each variant includes enough context to diagnose the issue. Variants map
/// to stable short strings via [`std::fmt::Display`], suitable for CLI
/// messages and dialogs; structured callers should inspect the variant
/// instead of the message.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not begin with the `VARC` signature.
    #[error("invalid archive signature")]
    InvalidSignature,

    /// The archive was written by a newer (or otherwise unknown) format
    /// version. The raw big-endian version word is included: high byte is
    /// the major version, low byte the minor.
    #[error("unsupported format version {version:#06x}")]
    UnsupportedVersion {
        /// The version word read from the header.
        version: u16,
    },

    /// The archive ended before a complete structure could be read.
    #[error("archive truncated at offset {offset}: {needed} more bytes needed")]
    Truncated {
        /// Byte offset at which the read was attempted.
        offset: usize,
        /// Number of bytes that could not be supplied.
        needed: usize,
    },

    /// An entry header or body violates a field bound.
    #[error("invalid entry {index}: {reason}")]
    InvalidEntry {
        /// Zero-based index of the offending entry.
        index: usize,
        /// A description of the violation.
        reason: String,
    },

    /// Bytes remain after the declared number of entries was consumed.
    #[error("{remaining} trailing bytes after last entry")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },

    /// The archive is encrypted and no password was supplied.
    #[error("password required for encrypted archive")]
    PasswordRequired,

    /// The supplied password does not decrypt the archive.
    #[error("wrong password")]
    WrongPassword,

    /// An empty password was supplied where one is required.
    #[error("password must not be empty")]
    EmptyPassword,

    /// PKCS#7 padding validation failed during decryption, indicating a
    /// wrong key, wrong IV, or tampered ciphertext.
    #[error("padding check failed")]
    BadPadding,

    /// The recomputed plaintext digest disagrees with the stored digest.
    #[error("checksum mismatch for '{path}'")]
    ChecksumMismatch {
        /// Archive path of the failing entry.
        path: String,
    },

    /// A DEFLATE stream could not be decoded.
    #[error("decompression failed: {0}")]
    Decompress(DecompressErrorKind),

    /// An entry with the same path already exists in the archive.
    #[error("duplicate path '{path}'")]
    DuplicatePath {
        /// The colliding archive path.
        path: String,
    },

    /// An archive path exceeds the 16-bit length limit of the entry header.
    #[error("path length {length} exceeds maximum of 65535 bytes")]
    PathTooLong {
        /// Byte length of the rejected path.
        length: usize,
    },

    /// An archive path failed validation for a reason other than length.
    #[error("invalid archive path: {0}")]
    InvalidPath(String),

    /// No entry with the given path exists in the archive.
    #[error("entry not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// `lock` was called on an archive that is already encrypted.
    #[error("archive is already encrypted")]
    AlreadyEncrypted,

    /// `unlock` or `change_password` was called on an unencrypted archive.
    #[error("archive is not encrypted")]
    NotEncrypted,

    /// `create` or `open` was called on an archive that is already open.
    #[error("archive is already open")]
    AlreadyOpen,

    /// An operation requiring an open archive was called on a closed one.
    #[error("archive is not open")]
    NotOpen,
}

impl Error {
    /// Returns `true` if this error is encryption-related.
    pub fn is_encryption_error(&self) -> bool {
        matches!(
            self,
            Error::PasswordRequired
                | Error::WrongPassword
                | Error::EmptyPassword
                | Error::BadPadding
        )
    }

    /// Returns `true` if this error indicates damaged archive data.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidSignature
                | Error::Truncated { .. }
                | Error::InvalidEntry { .. }
                | Error::TrailingBytes { .. }
                | Error::ChecksumMismatch { .. }
                | Error::Decompress(_)
        )
    }

    /// Returns `true` if the operation might succeed when retried with
    /// different input, such as a corrected password or a freed path.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::PasswordRequired | Error::WrongPassword | Error::EmptyPassword => true,
            Error::DuplicatePath { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Convenience constructor for [`Error::InvalidEntry`].
    pub fn invalid_entry(index: usize, reason: impl Into<String>) -> Self {
        Error::InvalidEntry {
            index,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for VARC operations.
pub type Result<T> = std::result::Result<T, Error>;
