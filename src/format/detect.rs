//! File type detection from content.
//!
//! The entry header carries a 32-bit type hint so that listings can label
//! entries without reversing their transforms. Detection looks at magic
//! prefixes in the first bytes, then falls back to a printable-text
//! heuristic over the first 256 bytes. The hint is informational only and
//! never influences how a payload is processed.

/// Semantic file type hint stored in the entry header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileType {
    /// Content could not be classified.
    #[default]
    Unknown,
    /// Mostly printable text.
    Text,
    /// Arbitrary binary data.
    Binary,
    /// PNG, GIF, JPEG, or WebP image.
    Image,
    /// MP3 or Ogg audio.
    Audio,
    /// ISO base media (MP4 family) video.
    Video,
    /// PDF document.
    Document,
    /// ZIP-family archive.
    Archive,
}

impl FileType {
    /// Returns the on-disk code for this type.
    pub fn code(self) -> u32 {
        match self {
            FileType::Unknown => 0,
            FileType::Text => 1,
            FileType::Binary => 2,
            FileType::Image => 3,
            FileType::Audio => 4,
            FileType::Video => 5,
            FileType::Document => 6,
            FileType::Archive => 7,
        }
    }

    /// Maps an on-disk code back to a type, with unrecognized codes
    /// becoming [`FileType::Unknown`].
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => FileType::Text,
            2 => FileType::Binary,
            3 => FileType::Image,
            4 => FileType::Audio,
            5 => FileType::Video,
            6 => FileType::Document,
            7 => FileType::Archive,
            _ => FileType::Unknown,
        }
    }

    /// Returns a human-readable name for this type.
    pub fn name(self) -> &'static str {
        match self {
            FileType::Unknown => "Unknown",
            FileType::Text => "Text",
            FileType::Binary => "Binary",
            FileType::Image => "Image",
            FileType::Audio => "Audio",
            FileType::Video => "Video",
            FileType::Document => "Document",
            FileType::Archive => "Archive",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detects the file type of a payload from its leading bytes.
///
/// Inputs shorter than 4 bytes are [`FileType::Unknown`]. Magic prefixes
/// are checked first; otherwise the first 256 bytes are scanned and the
/// payload is [`FileType::Text`] when at least 90% of them are printable
/// ASCII, tab, CR, or LF, else [`FileType::Binary`].
pub fn detect(data: &[u8]) -> FileType {
    if data.len() < 4 {
        return FileType::Unknown;
    }

    if data.starts_with(b"\x89PNG\r\n\x1a\n")
        || data.starts_with(b"GIF87a")
        || data.starts_with(b"GIF89a")
        || data.starts_with(&[0xFF, 0xD8, 0xFF])
    {
        return FileType::Image;
    }
    if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WEBP" {
        return FileType::Image;
    }

    if data.starts_with(b"ID3")
        || data.starts_with(&[0xFF, 0xFB])
        || data.starts_with(&[0xFF, 0xFA])
        || data.starts_with(b"OggS")
    {
        return FileType::Audio;
    }

    // ISO base media: a 32-bit box size followed by "ftyp".
    if data.len() >= 8 && &data[4..8] == b"ftyp" {
        return FileType::Video;
    }

    if data.starts_with(b"%PDF") {
        return FileType::Document;
    }

    if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
        return FileType::Archive;
    }

    let check = &data[..data.len().min(256)];
    let printable = check
        .iter()
        .filter(|&&b| (0x20..=0x7E).contains(&b) || b == b'\t' || b == b'\r' || b == b'\n')
        .count();

    // Text iff at least 90% printable (89% is Binary).
    if printable * 10 >= check.len() * 9 {
        FileType::Text
    } else {
        FileType::Binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short_is_unknown() {
        assert_eq!(detect(b""), FileType::Unknown);
        assert_eq!(detect(b"ab"), FileType::Unknown);
        assert_eq!(detect(b"abc"), FileType::Unknown);
    }

    #[test]
    fn test_image_magics() {
        assert_eq!(detect(b"\x89PNG\r\n\x1a\n....."), FileType::Image);
        assert_eq!(detect(b"GIF87a......"), FileType::Image);
        assert_eq!(detect(b"GIF89a......"), FileType::Image);
        assert_eq!(detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), FileType::Image);
        assert_eq!(detect(b"RIFF\x00\x00\x00\x00WEBPVP8 "), FileType::Image);
    }

    #[test]
    fn test_riff_without_webp_is_not_image() {
        // RIFF/WAVE is not in the image table; falls through to heuristic.
        let wave = b"RIFF\x24\x00\x00\x00WAVEfmt ";
        assert_ne!(detect(wave), FileType::Image);
    }

    #[test]
    fn test_audio_magics() {
        assert_eq!(detect(b"ID3\x04\x00\x00"), FileType::Audio);
        assert_eq!(detect(&[0xFF, 0xFB, 0x90, 0x00]), FileType::Audio);
        assert_eq!(detect(&[0xFF, 0xFA, 0x90, 0x00]), FileType::Audio);
        assert_eq!(detect(b"OggS\x00\x02"), FileType::Audio);
    }

    #[test]
    fn test_video_ftyp() {
        assert_eq!(
            detect(b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00"),
            FileType::Video
        );
    }

    #[test]
    fn test_document_and_archive() {
        assert_eq!(detect(b"%PDF-1.7\n"), FileType::Document);
        assert_eq!(detect(b"PK\x03\x04\x14\x00"), FileType::Archive);
        assert_eq!(detect(b"PK\x05\x06\x00\x00"), FileType::Archive);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(detect(b"Hello, world!\nSecond line.\n"), FileType::Text);
    }

    #[test]
    fn test_binary_data() {
        let data: Vec<u8> = (0..=255u8).cycle().take(256).collect();
        assert_eq!(detect(&data), FileType::Binary);
    }

    #[test]
    fn test_text_threshold_boundary() {
        // Exactly 90% printable of 100 scanned bytes: Text.
        let mut data = vec![b'a'; 90];
        data.extend(std::iter::repeat(0x00u8).take(10));
        assert_eq!(detect(&data), FileType::Text);

        // 89% printable: Binary.
        let mut data = vec![b'a'; 89];
        data.extend(std::iter::repeat(0x00u8).take(11));
        assert_eq!(detect(&data), FileType::Binary);
    }

    #[test]
    fn test_only_first_256_bytes_scanned() {
        // 256 printable bytes followed by garbage still counts as text.
        let mut data = vec![b'x'; 256];
        data.extend(std::iter::repeat(0x00u8).take(1024));
        assert_eq!(detect(&data), FileType::Text);
    }

    #[test]
    fn test_code_roundtrip() {
        for ft in [
            FileType::Unknown,
            FileType::Text,
            FileType::Binary,
            FileType::Image,
            FileType::Audio,
            FileType::Video,
            FileType::Document,
            FileType::Archive,
        ] {
            assert_eq!(FileType::from_code(ft.code()), ft);
        }
        assert_eq!(FileType::from_code(99), FileType::Unknown);
    }

    #[test]
    fn test_names() {
        assert_eq!(FileType::Text.name(), "Text");
        assert_eq!(FileType::Archive.to_string(), "Archive");
    }
}
