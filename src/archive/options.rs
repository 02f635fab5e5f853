//! Option and result types for archive operations.

use crate::compress;
use crate::crypto::Password;

/// Options controlling how entries are added to an archive.
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Compress payloads with DEFLATE. Defaults to true.
    pub compress: bool,
    /// DEFLATE level 0-9; 0 stores payloads verbatim. Defaults to 6.
    pub level: u32,
    /// Encrypt payloads. Requires `password` unless the archive is already
    /// encrypted. Defaults to false.
    pub encrypt: bool,
    /// Password for encryption.
    pub password: Option<Password>,
    /// Include dotfiles when walking directories. Defaults to true.
    pub include_hidden: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            compress: true,
            level: compress::DEFAULT_LEVEL,
            encrypt: false,
            password: None,
            include_hidden: true,
        }
    }
}

impl AddOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables compression.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Sets the compression level, clamped to 0-9.
    pub fn level(mut self, level: u32) -> Self {
        self.level = level.min(compress::MAX_LEVEL);
        self
    }

    /// Enables encryption with the given password.
    pub fn encrypt(mut self, password: Password) -> Self {
        self.encrypt = true;
        self.password = Some(password);
        self
    }

    /// Controls whether dotfiles are included by `add_directory`.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }
}

/// Options controlling extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Overwrite existing files. When false, existing files are skipped but
    /// still counted as processed. Defaults to false.
    pub overwrite: bool,
    /// When non-empty, only entries whose path contains any of these
    /// substrings are extracted.
    pub filter: Vec<String>,
}

impl ExtractOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables overwriting of existing files.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Adds a substring filter.
    pub fn filter(mut self, needle: impl Into<String>) -> Self {
        self.filter.push(needle.into());
        self
    }
}

/// Options controlling the formatted `list` output.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Emit the column header and separator rows. Defaults to true.
    pub show_details: bool,
    /// Append a hex digest column. Defaults to false.
    pub show_checksums: bool,
    /// Append a modification time column. Defaults to true.
    pub show_timestamps: bool,
    /// Format sizes as human-readable strings. Defaults to true.
    pub human_readable: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_details: true,
            show_checksums: false,
            show_timestamps: true,
            human_readable: true,
        }
    }
}

impl ListOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates raw output options: no checksums, no timestamps, exact byte
    /// counts.
    pub fn raw() -> Self {
        Self {
            show_details: true,
            show_checksums: false,
            show_timestamps: false,
            human_readable: false,
        }
    }

    /// Enables the checksum column.
    pub fn checksums(mut self, show: bool) -> Self {
        self.show_checksums = show;
        self
    }
}

/// Outcome of a bulk add operation.
#[derive(Debug, Clone, Default)]
pub struct AddResult {
    /// Number of files added.
    pub files_added: u64,
    /// Total plaintext bytes added.
    pub bytes_added: u64,
    /// Paths skipped because an entry with the same path already exists.
    pub skipped: Vec<String>,
}

impl AddResult {
    pub(crate) fn merge(&mut self, other: AddResult) {
        self.files_added += other.files_added;
        self.bytes_added += other.bytes_added;
        self.skipped.extend(other.skipped);
    }
}

/// Outcome of a bulk extract operation.
#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    /// Number of entries processed, including skipped existing files.
    pub files_processed: u64,
    /// Total plaintext bytes processed.
    pub bytes_processed: u64,
    /// Paths whose files could not be written; the operation continued.
    pub failures: Vec<String>,
}

/// Aggregate statistics over an archive's entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveStats {
    /// Number of entries.
    pub entries: u64,
    /// Sum of original payload sizes.
    pub total_original_size: u64,
    /// Sum of stored payload sizes.
    pub total_stored_size: u64,
}

impl ArchiveStats {
    /// Returns the stored-to-original ratio as a percentage, or 0 for an
    /// archive with no payload bytes.
    pub fn ratio(&self) -> f64 {
        if self.total_original_size == 0 {
            0.0
        } else {
            100.0 * self.total_stored_size as f64 / self.total_original_size as f64
        }
    }

    /// Returns the space saving as a percentage of the original size.
    pub fn savings(&self) -> f64 {
        if self.total_original_size == 0 {
            0.0
        } else {
            100.0 - self.ratio()
        }
    }
}
