//! Validated archive path type.
//!
//! Paths inside a VARC archive use forward slashes, carry no leading slash,
//! and are at most 65 535 bytes long so that their length fits the 16-bit
//! field of the entry header. Validation also rejects `.` and `..` segments
//! so that a hostile archive cannot escape the extraction directory.

use crate::{Error, Result};
use std::fmt;

/// Maximum length of an archive path in bytes, fixed by the 16-bit
/// `path_length` field of the entry header.
pub const MAX_PATH_LENGTH: usize = 65_535;

/// A validated archive path.
///
/// `EntryPath` guarantees that:
/// - the path is non-empty, valid UTF-8, and at most [`MAX_PATH_LENGTH`] bytes
/// - no NUL bytes are present
/// - the path is relative (no leading `/`)
/// - no empty, `.`, or `..` segments exist
///
/// Two paths are equal iff their byte representations are equal; the archive
/// enforces uniqueness with exactly this comparison.
///
/// # Examples
///
/// ```
/// use varc::EntryPath;
///
/// let path = EntryPath::new("dir/file.txt").unwrap();
/// assert_eq!(path.as_str(), "dir/file.txt");
///
/// assert!(EntryPath::new("../secret").is_err());
/// assert!(EntryPath::new("/absolute").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryPath(String);

impl EntryPath {
    /// Creates a new `EntryPath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathTooLong`] when the path exceeds
    /// [`MAX_PATH_LENGTH`] bytes and [`Error::InvalidPath`] for every other
    /// validation failure.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidPath("empty path".into()));
        }
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::PathTooLong { length: s.len() });
        }
        if s.contains('\0') {
            return Err(Error::InvalidPath("contains NUL byte".into()));
        }
        if s.starts_with('/') {
            return Err(Error::InvalidPath("absolute path not allowed".into()));
        }
        if s.ends_with('/') {
            return Err(Error::InvalidPath("trailing slash not allowed".into()));
        }
        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidPath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidPath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidPath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }
        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path as raw bytes, exactly as serialized on disk.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// Returns an iterator over the path segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_simple_file() {
        let path = EntryPath::new("file.txt").unwrap();
        assert_eq!(path.as_str(), "file.txt");
    }

    #[test]
    fn test_valid_nested_path() {
        let path = EntryPath::new("a/b/c/d.txt").unwrap();
        assert_eq!(path.as_str(), "a/b/c/d.txt");
        assert_eq!(path.file_name(), "d.txt");
        assert_eq!(path.parent(), Some("a/b/c"));
    }

    #[test]
    fn test_valid_unicode() {
        let path = EntryPath::new("日本語/файл.txt").unwrap();
        assert_eq!(path.as_str(), "日本語/файл.txt");
    }

    #[test]
    fn test_valid_dotfile() {
        assert!(EntryPath::new(".gitignore").is_ok());
        assert!(EntryPath::new("file..txt").is_ok());
        assert!(EntryPath::new("...").is_ok());
    }

    #[test]
    fn test_invalid_empty() {
        assert!(matches!(
            EntryPath::new("").unwrap_err(),
            Error::InvalidPath(_)
        ));
    }

    #[test]
    fn test_invalid_nul_byte() {
        let err = EntryPath::new("file\0.txt").unwrap_err();
        assert!(err.to_string().contains("NUL"));
    }

    #[test]
    fn test_invalid_absolute() {
        let err = EntryPath::new("/etc/passwd").unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_invalid_traversal() {
        assert!(EntryPath::new("../secret").is_err());
        assert!(EntryPath::new("a/../b").is_err());
        assert!(EntryPath::new("./file").is_err());
    }

    #[test]
    fn test_invalid_segments() {
        assert!(EntryPath::new("a//b").is_err());
        assert!(EntryPath::new("dir/").is_err());
    }

    #[test]
    fn test_length_boundaries() {
        // 65 535 bytes is accepted, 65 536 is rejected.
        let max = "a".repeat(MAX_PATH_LENGTH);
        assert!(EntryPath::new(&max).is_ok());

        let over = "a".repeat(MAX_PATH_LENGTH + 1);
        assert!(matches!(
            EntryPath::new(&over).unwrap_err(),
            Error::PathTooLong { length } if length == MAX_PATH_LENGTH + 1
        ));
    }

    #[test]
    fn test_byte_equality() {
        let a = EntryPath::new("dir/file.txt").unwrap();
        let b = EntryPath::new("dir/file.txt").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_components() {
        let path = EntryPath::new("a/b/c.txt").unwrap();
        let parts: Vec<_> = path.components().collect();
        assert_eq!(parts, vec!["a", "b", "c.txt"]);
    }

    #[test]
    fn test_try_from() {
        let path: EntryPath = "dir/file.txt".try_into().unwrap();
        assert_eq!(path.as_str(), "dir/file.txt");
        let path: EntryPath = String::from("x/y").try_into().unwrap();
        assert_eq!(path.as_str(), "x/y");
    }
}
