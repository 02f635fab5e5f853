//! Malformed-archive tests: truncation, bad magic, flag inconsistencies,
//! and tamper detection.

mod common;

use std::fs;

use varc::{AddOptions, Error, Password};

const GLOBAL_HEADER_SIZE: usize = 64;
const ENTRY_HEADER_SIZE: usize = 26;

#[test]
fn test_bad_signature() {
    let (_dir, path) = common::workspace("sig.varc");
    common::build_archive(&path, &[], &AddOptions::default()).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[0] = b'X';
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        common::open_archive(&path, None).unwrap_err(),
        Error::InvalidSignature
    ));
}

#[test]
fn test_unsupported_version() {
    let (_dir, path) = common::workspace("ver.varc");
    common::build_archive(&path, &[], &AddOptions::default()).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[5] = 0x04; // version 0.4
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        common::open_archive(&path, None).unwrap_err(),
        Error::UnsupportedVersion { version: 0x0004 }
    ));
}

#[test]
fn test_truncated_global_header() {
    let (_dir, path) = common::workspace("short.varc");
    common::build_archive(&path, &[("a.txt", b"data")], &AddOptions::default()).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..40]).unwrap();

    assert!(matches!(
        common::open_archive(&path, None).unwrap_err(),
        Error::Truncated { .. }
    ));
}

#[test]
fn test_truncated_entry() {
    let (_dir, path) = common::workspace("cut.varc");
    common::build_archive(&path, &[("a.txt", b"payload bytes")], &AddOptions::default()).unwrap();

    let bytes = fs::read(&path).unwrap();
    // Cut inside the entry record, after the entry header.
    fs::write(&path, &bytes[..GLOBAL_HEADER_SIZE + ENTRY_HEADER_SIZE + 2]).unwrap();

    let err = common::open_archive(&path, None).unwrap_err();
    assert!(
        matches!(err, Error::Truncated { .. } | Error::InvalidEntry { .. }),
        "got {err:?}"
    );
}

#[test]
fn test_file_count_exceeds_data() {
    let (_dir, path) = common::workspace("count.varc");
    common::build_archive(&path, &[("a.txt", b"data")], &AddOptions::default()).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[11] = 5; // file_count = 5, but only one record follows
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        common::open_archive(&path, None).unwrap_err(),
        Error::Truncated { .. }
    ));
}

#[test]
fn test_trailing_bytes_rejected() {
    let (_dir, path) = common::workspace("trailing.varc");
    common::build_archive(&path, &[("a.txt", b"data")], &AddOptions::default()).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes.extend_from_slice(b"extra junk");
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        common::open_archive(&path, None).unwrap_err(),
        Error::TrailingBytes { remaining: 10 }
    ));
}

#[test]
fn test_entry_flag_contradicts_header() {
    let (_dir, path) = common::workspace("flags.varc");
    common::build_archive(&path, &[("a.txt", b"data")], &AddOptions::new().compress(false))
        .unwrap();

    // Set the entry's encrypted flag while the archive header stays
    // unencrypted. The flags field is the last 4 bytes of the entry header.
    let mut bytes = fs::read(&path).unwrap();
    let flags_offset = GLOBAL_HEADER_SIZE + ENTRY_HEADER_SIZE - 1;
    bytes[flags_offset] |= 0x02;
    fs::write(&path, &bytes).unwrap();

    let err = common::open_archive(&path, None).unwrap_err();
    assert!(matches!(err, Error::InvalidEntry { .. }), "got {err:?}");
}

#[test]
fn test_tampered_plain_compressed_entry() {
    // The S5 shape without encryption: one compressed entry, one flipped
    // payload byte. Verification must fail with a checksum or
    // decompression error; which one depends on where the flip lands in
    // the DEFLATE stream.
    let (_dir, path) = common::workspace("tamper1.varc");
    let data: Vec<u8> = (0u16..2048).map(|i| (i % 7) as u8).collect();
    common::build_archive(&path, &[("t.bin", &data)], &AddOptions::new().level(6)).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let payload_offset = GLOBAL_HEADER_SIZE + ENTRY_HEADER_SIZE + "t.bin".len();
    bytes[payload_offset + 20] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let mut archive = common::open_archive(&path, None).unwrap();
    let err = archive.verify(None).unwrap_err();
    assert!(
        matches!(err, Error::ChecksumMismatch { .. } | Error::Decompress(_)),
        "got {err:?}"
    );
}

#[test]
fn test_tampered_encrypted_compressed_entry() {
    // Two entries so that the tamper hits the second one: the first entry
    // still validates the password at open, and verify then reports the
    // corruption in the second.
    let (_dir, path) = common::workspace("tamper2.varc");
    let good: Vec<u8> = vec![1u8; 600];
    let victim: Vec<u8> = b"victim payload ".iter().cycle().take(900).copied().collect();

    let mut archive = varc::Archive::new();
    archive.create(&path).unwrap();
    let options = AddOptions::new().level(6).encrypt(Password::new("pw"));
    archive.add_bytes("good.bin", good, &options).unwrap();
    archive.add_bytes("victim.bin", victim, &options).unwrap();
    archive.save(None).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    // Find the second record: skip the first record using its stored size.
    let first_stored = u64::from_be_bytes(
        bytes[GLOBAL_HEADER_SIZE + 10..GLOBAL_HEADER_SIZE + 18]
            .try_into()
            .unwrap(),
    ) as usize;
    let second_record = GLOBAL_HEADER_SIZE + ENTRY_HEADER_SIZE + "good.bin".len() + first_stored + 32;
    let second_payload = second_record + ENTRY_HEADER_SIZE + "victim.bin".len();
    bytes[second_payload + 10] ^= 0x55;
    fs::write(&path, &bytes).unwrap();

    let mut archive = common::open_archive(&path, Some("pw")).unwrap();
    let err = archive.verify(None).unwrap_err();
    assert!(
        matches!(err, Error::ChecksumMismatch { .. } | Error::Decompress(_)),
        "got {err:?}"
    );
}

#[test]
fn test_tampered_single_encrypted_entry_fails_somewhere() {
    // With a single tampered entry the corruption may already surface at
    // open (the password check reconstructs the first entry); any typed
    // failure is acceptable, silence is not.
    let (_dir, path) = common::workspace("tamper3.varc");
    let mut archive = varc::Archive::new();
    archive.create(&path).unwrap();
    archive
        .add_bytes(
            "only.bin",
            vec![0xABu8; 512],
            &AddOptions::new().level(6).encrypt(Password::new("pw")),
        )
        .unwrap();
    archive.save(None).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let payload_offset = GLOBAL_HEADER_SIZE + ENTRY_HEADER_SIZE + "only.bin".len();
    bytes[payload_offset + 5] ^= 0x80;
    fs::write(&path, &bytes).unwrap();

    match common::open_archive(&path, Some("pw")) {
        Err(e) => assert!(
            matches!(
                e,
                Error::WrongPassword | Error::ChecksumMismatch { .. } | Error::Decompress(_)
            ),
            "got {e:?}"
        ),
        Ok(mut archive) => {
            let err = archive.verify(None).unwrap_err();
            assert!(
                matches!(err, Error::ChecksumMismatch { .. } | Error::Decompress(_)),
                "got {err:?}"
            );
        }
    }
}

#[test]
fn test_tampered_digest() {
    let (_dir, path) = common::workspace("digest.varc");
    common::build_archive(&path, &[("d.txt", b"digest me")], &AddOptions::new().compress(false))
        .unwrap();

    let mut bytes = fs::read(&path).unwrap();
    // The digest is the last 32 bytes of the single record.
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    let mut archive = common::open_archive(&path, None).unwrap();
    assert!(matches!(
        archive.verify(None).unwrap_err(),
        Error::ChecksumMismatch { .. }
    ));
    assert!(matches!(
        archive.get_entry_data("d.txt").unwrap_err(),
        Error::ChecksumMismatch { .. }
    ));
}

#[test]
fn test_plain_payload_size_mismatch() {
    let (_dir, path) = common::workspace("size.varc");
    common::build_archive(&path, &[("s.txt", b"eight by")], &AddOptions::new().compress(false))
        .unwrap();

    // Shrink original_size without touching the stored payload.
    let mut bytes = fs::read(&path).unwrap();
    bytes[GLOBAL_HEADER_SIZE + 9] = 3;
    fs::write(&path, &bytes).unwrap();

    let err = common::open_archive(&path, None).unwrap_err();
    assert!(matches!(err, Error::InvalidEntry { .. }), "got {err:?}");
}

#[test]
fn test_not_an_archive_at_all() {
    let (_dir, path) = common::workspace("garbage.varc");
    fs::write(&path, b"this is not a varc archive, not even close").unwrap();
    let err = common::open_archive(&path, None).unwrap_err();
    assert!(
        matches!(err, Error::InvalidSignature | Error::Truncated { .. }),
        "got {err:?}"
    );
}
