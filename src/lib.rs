//! # varc
//!
//! A library for reading and writing VARC archives: single-file containers
//! that bundle an ordered collection of byte payloads with their paths,
//! type hints, and SHA-256 integrity digests, optionally compressing
//! payloads with DEFLATE and optionally encrypting them with an
//! AES-256-CBC key derived from a password.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use varc::{AddOptions, Archive, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Archive::new();
//!     archive.create("backup.varc")?;
//!     archive.add_path("notes.txt", &AddOptions::default())?;
//!     archive.add_bytes("hello.txt", b"Hello, World!".to_vec(), &AddOptions::default())?;
//!     archive.save(None)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use varc::{Archive, ExtractOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Archive::new();
//!     archive.open("backup.varc", None)?;
//!     for entry in archive.entries() {
//!         println!("{}: {} bytes", entry.path(), entry.original_size());
//!     }
//!     archive.extract_all("./output", None, &ExtractOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Encrypted Archives
//!
//! ```rust,no_run
//! use varc::{Archive, Password, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Archive::new();
//!     archive.open("secret.varc", Some(&Password::new("p@ss")))?;
//!     let data = archive.get_entry_data("secret.txt")?;
//!     # let _ = data;
//!     Ok(())
//! }
//! ```
//!
//! ## Format
//!
//! A `.varc` file is a 64-byte global header followed by one record per
//! entry: a 26-byte entry header, the UTF-8 path, the stored payload, and
//! a 32-byte SHA-256 digest of the original plaintext. All integers are
//! big-endian. The digest covers the plaintext rather than the stored
//! bytes, so verification detects both ciphertext corruption and
//! plaintext-level tampering; see [`format`] for the exact layout.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`; see [`Error`] for the failure
//! taxonomy.
//!
//! ## Concurrency
//!
//! An [`Archive`] is single-threaded by contract: operations block until
//! complete and callers serialize access externally. Bulk operations
//! invoke an optional progress callback between entries.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for streaming reads (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

mod archive;
pub mod compress;
pub mod crypto;
mod entry_path;
pub mod error;
pub mod format;
pub mod hash;
pub mod matcher;
pub mod progress;

pub use archive::{
    AddOptions, AddResult, Archive, ArchiveStats, Entry, ExtractOptions, ExtractResult,
    ListOptions, Payload,
};
pub use crypto::Password;
pub use entry_path::{EntryPath, MAX_PATH_LENGTH};
pub use error::{DecompressErrorKind, Error, Result};
pub use format::{ArchiveFlags, EntryFlags, FileType, GlobalHeader};
pub use progress::ProgressFn;
