//! SHA-256 digest computation and constant-time comparison.
//!
//! Every entry in a VARC archive stores the SHA-256 of its original
//! plaintext. Verification recomputes that digest after reversing the
//! compression and encryption transforms and compares it in constant time
//! so that the comparison cannot leak how many leading bytes matched.

use sha2::{Digest as _, Sha256};
use std::io::{self, Read};
use subtle::ConstantTimeEq;

use crate::READ_BUFFER_SIZE;

/// Size of a SHA-256 digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// A SHA-256 digest.
pub type Digest = [u8; DIGEST_SIZE];

/// Computes the SHA-256 digest of a byte slice.
///
/// An empty slice yields the well-known SHA-256 of the empty string.
///
/// # Example
///
/// ```
/// let digest = varc::hash::digest(b"Hello, world!\n");
/// assert!(varc::hash::to_hex(&digest).starts_with("d9014c46"));
/// ```
pub fn digest(data: &[u8]) -> Digest {
    Sha256::digest(data).into()
}

/// Computes the SHA-256 digest by reading a stream to its end.
pub fn digest_reader<R: Read>(reader: &mut R) -> io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Compares two digests in constant time.
///
/// The running time depends only on the digest length, never on the
/// position of the first differing byte.
pub fn equals_ct(a: &Digest, b: &Digest) -> bool {
    a.ct_eq(b).into()
}

/// Formats a digest as lowercase hex.
pub fn to_hex(digest: &Digest) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(DIGEST_SIZE * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_digest_empty() {
        assert_eq!(to_hex(&digest(b"")), EMPTY_SHA256);
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            to_hex(&digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_hello_world() {
        assert!(to_hex(&digest(b"Hello, world!\n")).starts_with("d9014c46"));
    }

    #[test]
    fn test_digest_deterministic() {
        assert_eq!(digest(b"same input"), digest(b"same input"));
        assert_ne!(digest(b"input a"), digest(b"input b"));
    }

    #[test]
    fn test_digest_reader_matches_oneshot() {
        let data = vec![0x5Au8; 100_000];
        let from_reader = digest_reader(&mut Cursor::new(&data)).unwrap();
        assert_eq!(from_reader, digest(&data));
    }

    #[test]
    fn test_equals_ct() {
        let a = digest(b"payload");
        let mut b = a;
        assert!(equals_ct(&a, &b));
        b[31] ^= 0x01;
        assert!(!equals_ct(&a, &b));
        b[31] ^= 0x01;
        b[0] ^= 0x80;
        assert!(!equals_ct(&a, &b));
    }

    #[test]
    fn test_to_hex_length() {
        assert_eq!(to_hex(&digest(b"x")).len(), 64);
    }
}
