//! DEFLATE compression for entry payloads.
//!
//! VARC stores compressed payloads as gzip-wrapped DEFLATE streams (zlib
//! window bits 31). Levels follow the zlib convention: 0 stores the data
//! unchanged, 9 compresses hardest, 6 is the default.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{ErrorKind, Read, Write};

use crate::error::DecompressErrorKind;
use crate::{Error, Result};

/// Default compression level.
pub const DEFAULT_LEVEL: u32 = 6;
/// Maximum compression level.
pub const MAX_LEVEL: u32 = 9;

/// Returns the conventional name for a compression level.
///
/// The naming matches the CLI surface: 0 "None", 1 "Fastest", 2-3 "Fast",
/// 4-6 "Default", 7-9 "Best".
pub fn level_name(level: u32) -> &'static str {
    match level {
        0 => "None",
        1 => "Fastest",
        2..=3 => "Fast",
        4..=6 => "Default",
        _ => "Best",
    }
}

/// Compresses a buffer at the given level.
///
/// Level 0 passes the input through unchanged; callers should store such
/// payloads without the compressed flag. Levels above [`MAX_LEVEL`] are
/// clamped.
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    if level == 0 {
        return Ok(data.to_vec());
    }
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        Compression::new(level.min(MAX_LEVEL)),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompresses a gzip-wrapped DEFLATE stream.
///
/// When `expected_len` is given, the decoded stream must have exactly that
/// length.
///
/// # Errors
///
/// Returns [`Error::Decompress`] with [`DecompressErrorKind::Truncated`]
/// when the stream ends early, [`DecompressErrorKind::Corrupted`] for any
/// other decoding failure, and [`DecompressErrorKind::SizeMismatch`] when
/// the decoded length disagrees with `expected_len`.
pub fn decompress(data: &[u8], expected_len: Option<u64>) -> Result<Vec<u8>> {
    if data.is_empty() {
        return match expected_len {
            Some(0) | None => Ok(Vec::new()),
            Some(_) => Err(Error::Decompress(DecompressErrorKind::SizeMismatch)),
        };
    }

    let mut decoder = GzDecoder::new(data);
    let capacity = expected_len.unwrap_or(data.len() as u64 * 2).min(1 << 24) as usize;
    let mut output = Vec::with_capacity(capacity);
    decoder.read_to_end(&mut output).map_err(|e| {
        Error::Decompress(match e.kind() {
            ErrorKind::UnexpectedEof => DecompressErrorKind::Truncated,
            _ => DecompressErrorKind::Corrupted,
        })
    })?;

    if let Some(expected) = expected_len {
        if output.len() as u64 != expected {
            return Err(Error::Decompress(DecompressErrorKind::SizeMismatch));
        }
    }
    Ok(output)
}
