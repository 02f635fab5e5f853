//! Whole-archive serialization and parsing.
//!
//! The parser borrows one contiguous archive buffer and slices into it; it
//! never seeks and never back-references. Payload bytes are copied out into
//! owned buffers so that the archive buffer can be dropped after parsing.

use crate::hash::Digest;
use crate::{Error, Result};

use super::{DIGEST_SIZE, ENTRY_HEADER_SIZE, EntryHeader, GlobalHeader, GLOBAL_HEADER_SIZE};

/// One entry as laid out on disk: header, path, stored payload, digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The fixed entry header.
    pub header: EntryHeader,
    /// The UTF-8 archive path.
    pub path: String,
    /// The stored payload bytes (after any compression and encryption).
    pub payload: Vec<u8>,
    /// SHA-256 of the original plaintext.
    pub digest: Digest,
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

/// Serializes a complete archive: global header, then each record.
pub fn write_archive(header: &GlobalHeader, records: &[Record]) -> Vec<u8> {
    let total: usize = GLOBAL_HEADER_SIZE
        + records
            .iter()
            .map(|r| ENTRY_HEADER_SIZE + r.path.len() + r.payload.len() + DIGEST_SIZE)
            .sum::<usize>();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&header.to_bytes());
    for record in records {
        out.extend_from_slice(&record.header.to_bytes());
        out.extend_from_slice(record.path.as_bytes());
        out.extend_from_slice(&record.payload);
        out.extend_from_slice(&record.digest);
    }
    out
}

/// Parses a complete archive buffer into its header and records.
///
/// The cursor starts at byte 64 and reads exactly `file_count` records.
/// Invariants checked here: the signature and version (via
/// [`GlobalHeader::parse`]), that each record fits the remaining buffer,
/// that each stored payload is exactly `stored_size` bytes, that each path
/// is valid UTF-8 of the declared length, and that no bytes remain after
/// the last record.
///
/// # Errors
///
/// [`Error::Truncated`] when the buffer runs out mid-record,
/// [`Error::InvalidEntry`] for bad paths or oversized fields, and
/// [`Error::TrailingBytes`] when unconsumed bytes follow the final record.
pub fn read_archive(bytes: &[u8]) -> Result<(GlobalHeader, Vec<Record>)> {
    let header = GlobalHeader::parse(bytes)?;
    let mut cursor = Cursor::new(bytes, GLOBAL_HEADER_SIZE);

    let mut records = Vec::with_capacity(header.file_count.min(1024) as usize);
    for index in 0..header.file_count as usize {
        let entry_header = EntryHeader::parse(cursor.take(ENTRY_HEADER_SIZE)?)?;

        let path_bytes = cursor.take(entry_header.path_length as usize)?;
        let path = std::str::from_utf8(path_bytes)
            .map_err(|_| Error::invalid_entry(index, "path is not valid UTF-8"))?
            .to_string();

        let stored_size = usize::try_from(entry_header.stored_size)
            .map_err(|_| Error::invalid_entry(index, "stored size exceeds address space"))?;
        if stored_size > cursor.remaining() {
            return Err(Error::invalid_entry(
                index,
                format!(
                    "stored size {} exceeds {} remaining bytes",
                    stored_size,
                    cursor.remaining()
                ),
            ));
        }
        let payload = cursor.take(stored_size)?.to_vec();

        let digest: Digest = cursor
            .take(DIGEST_SIZE)?
            .try_into()
            .expect("digest slice is exactly DIGEST_SIZE bytes");

        records.push(Record {
            header: entry_header,
            path,
            payload,
            digest,
        });
    }

    if cursor.remaining() > 0 {
        return Err(Error::TrailingBytes {
            remaining: cursor.remaining(),
        });
    }

    Ok((header, records))
}
