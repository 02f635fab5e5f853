//! Lookup, listing, and statistics.

use chrono::{DateTime, Local};

use crate::hash;
use crate::matcher::wildcard_match;
use crate::progress::format_size;

use super::{Archive, ArchiveStats, Entry, ListOptions};

impl Archive {
    /// Finds the entry with the given path.
    pub fn find_entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path().as_str() == path)
    }

    /// Finds every entry whose path matches the wildcard pattern.
    pub fn find_entries(&self, pattern: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| wildcard_match(e.path().as_str(), pattern))
            .collect()
    }

    /// Returns true if an entry with the given path exists.
    pub fn entry_exists(&self, path: &str) -> bool {
        self.find_entry(path).is_some()
    }

    /// Sum of original payload sizes over all entries.
    pub fn total_original_size(&self) -> u64 {
        self.entries.iter().map(|e| e.original_size()).sum()
    }

    /// Sum of stored payload sizes over all entries.
    pub fn total_stored_size(&self) -> u64 {
        self.entries.iter().map(|e| e.stored_size()).sum()
    }

    /// Returns aggregate statistics.
    pub fn stats(&self) -> ArchiveStats {
        ArchiveStats {
            entries: self.entries.len() as u64,
            total_original_size: self.total_original_size(),
            total_stored_size: self.total_stored_size(),
        }
    }

    /// Formats the archive contents as a text listing.
    pub fn list(&self, options: &ListOptions) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let path = self
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "VARC Archive Contents: {path}");
        let _ = writeln!(out, "========================================");
        let _ = writeln!(out);

        if self.entries.is_empty() {
            let _ = writeln!(out, "(empty archive)");
            return out;
        }

        if options.show_details {
            let _ = write!(out, "{:<50}{:>12}{:>10}", "Name", "Size", "Type");
            if options.show_checksums {
                let _ = write!(out, "  {:<64}", "Checksum");
            }
            if options.show_timestamps {
                let _ = write!(out, "  {:<20}", "Modified");
            }
            let _ = writeln!(out);

            let _ = write!(out, "{}{:>12}{:>10}", "-".repeat(50), "-".repeat(10), "-".repeat(8));
            if options.show_checksums {
                let _ = write!(out, "  {}", "-".repeat(64));
            }
            if options.show_timestamps {
                let _ = write!(out, "  {}", "-".repeat(20));
            }
            let _ = writeln!(out);
        }

        for entry in &self.entries {
            let mut name = entry.path().as_str().to_string();
            let chars = name.chars().count();
            if chars > 48 {
                let tail: String = name.chars().skip(chars - 47).collect();
                name = format!("...{tail}");
            }

            let mut size = if options.human_readable {
                format_size(entry.original_size())
            } else {
                entry.original_size().to_string()
            };
            if entry.is_compressed() && entry.stored_size() != entry.original_size() {
                size.push('*');
            }

            let _ = write!(out, "{:<50}{:>12}{:>10}", name, size, entry.file_type().name());
            if options.show_checksums {
                let _ = write!(out, "  {}", hash::to_hex(entry.digest()));
            }
            if options.show_timestamps {
                let time: DateTime<Local> = entry.modified().into();
                let _ = write!(out, "  {:<20}", time.format("%Y-%m-%d %H:%M:%S"));
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out);
        let total = if options.human_readable {
            format_size(self.total_original_size())
        } else {
            self.total_original_size().to_string()
        };
        let _ = writeln!(out, "Total: {} files, {}", self.entries.len(), total);

        if self.header.is_compressed() {
            let stats = self.stats();
            let stored = if options.human_readable {
                format_size(stats.total_stored_size)
            } else {
                stats.total_stored_size.to_string()
            };
            let _ = writeln!(out, "Compressed: {} ({:.1}%)", stored, stats.ratio());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::AddOptions;
    use super::*;

    fn sample_archive() -> Archive {
        let mut archive = Archive::new();
        archive.create("/tmp/query.varc").unwrap();
        archive
            .add_bytes("docs/readme.txt", b"plain text here".to_vec(), &AddOptions::new().compress(false))
            .unwrap();
        archive
            .add_bytes("data/blob.bin", vec![0u8; 2048], &AddOptions::default())
            .unwrap();
        archive
    }

    #[test]
    fn test_find_entry() {
        let archive = sample_archive();
        assert!(archive.find_entry("docs/readme.txt").is_some());
        assert!(archive.find_entry("missing").is_none());
        assert!(archive.entry_exists("data/blob.bin"));
    }

    #[test]
    fn test_find_entries_pattern() {
        let archive = sample_archive();
        let matches = archive.find_entries("docs/*");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path().as_str(), "docs/readme.txt");
        assert_eq!(archive.find_entries("*").len(), 2);
        assert!(archive.find_entries("*.zip").is_empty());
    }

    #[test]
    fn test_totals() {
        let archive = sample_archive();
        assert_eq!(archive.total_original_size(), 15 + 2048);
        let stats = archive.stats();
        assert_eq!(stats.entries, 2);
        assert!(stats.total_stored_size < stats.total_original_size);
    }

    #[test]
    fn test_list_contains_entries_and_totals() {
        let archive = sample_archive();
        let listing = archive.list(&ListOptions::default());
        assert!(listing.contains("docs/readme.txt"));
        assert!(listing.contains("data/blob.bin"));
        assert!(listing.contains("Total: 2 files"));
        assert!(listing.contains("Compressed:"));
        assert!(listing.contains("Text"));
    }

    #[test]
    fn test_list_empty() {
        let mut archive = Archive::new();
        archive.create("/tmp/empty-list.varc").unwrap();
        assert!(archive.list(&ListOptions::default()).contains("(empty archive)"));
    }

    #[test]
    fn test_list_checksums_column() {
        let archive = sample_archive();
        let listing = archive.list(&ListOptions::new().checksums(true));
        let digest_hex = hash::to_hex(archive.entries()[0].digest());
        assert!(listing.contains(&digest_hex));
    }

    #[test]
    fn test_list_raw_sizes() {
        let archive = sample_archive();
        let listing = archive.list(&ListOptions::raw());
        assert!(listing.contains("2048"));
        assert!(!listing.contains("Modified"));
    }
}
