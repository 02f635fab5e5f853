//! Removing entries from an archive.

use crate::matcher::wildcard_match;
use crate::{Error, Result};

use super::Archive;

impl Archive {
    /// Removes the entry with the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no entry matches.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        self.require_open()?;
        let index = self
            .entries
            .iter()
            .position(|e| e.path().as_str() == path)
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })?;
        self.entries.remove(index);
        self.modified = true;
        Ok(())
    }

    /// Removes every entry whose path matches the wildcard pattern and
    /// returns how many were removed.
    ///
    /// The pattern uses `*` and `?` only; matching is case-sensitive and
    /// whole-string. Removing zero entries is not an error and does not
    /// mark the archive dirty.
    pub fn remove_pattern(&mut self, pattern: &str) -> Result<u64> {
        self.require_open()?;
        let before = self.entries.len();
        self.entries.retain(|e| !wildcard_match(e.path().as_str(), pattern));
        let removed = (before - self.entries.len()) as u64;
        if removed > 0 {
            self.modified = true;
        }
        Ok(removed)
    }

    /// Removes every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.require_open()?;
        if !self.entries.is_empty() {
            self.entries.clear();
            self.modified = true;
        }
        Ok(())
    }
}
