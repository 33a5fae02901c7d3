//! The ID3v1 codec: a fixed 128-byte trailer in two dialects, 1.0 and 1.1.

use crate::text;

const TAG_SIZE: usize = 128;
const TITLE_SIZE: usize = 30;
const ARTIST_SIZE: usize = 30;
const ALBUM_SIZE: usize = 30;
const YEAR_SIZE: usize = 4;
const V10_COMMENT_SIZE: usize = 30;
const V11_COMMENT_SIZE: usize = 28;

/// The common fields of an ID3v1.0 tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v10Fields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub genre: u8,
}

/// The common fields of an ID3v1.1 tag: identical to 1.0, but the comment
/// field is two bytes shorter to make room for the track number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v11Fields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: u8,
    pub genre: u8,
}

/// A tagged union over the two ID3v1 dialects. Which variant is present is
/// a type-level fact once parsed; the discriminator is only probed once,
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Id3v1Tag {
    V10(Id3v10Fields),
    V11(Id3v11Fields),
}

impl Id3v1Tag {
    /// Detects and parses an ID3v1 trailer from the last 128 bytes of
    /// `buf`, if present. `buf` must be the entire file (or at least its
    /// final 128 bytes); returns `None` if `buf` is too short or the
    /// magic does not match.
    ///
    /// The 1.1 discriminator (byte 125 NUL, byte 126 non-zero) is checked
    /// before falling back to 1.0, so the "both NUL" ambiguous case
    /// resolves to 1.0 by evaluation order, as the source does.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < TAG_SIZE {
            return None;
        }

        let tag = &buf[buf.len() - TAG_SIZE..];

        if &tag[0..3] != b"TAG" {
            return None;
        }

        let title = text::read_fixed_latin1(&tag[3..33]);
        let artist = text::read_fixed_latin1(&tag[33..63]);
        let album = text::read_fixed_latin1(&tag[63..93]);
        let year = text::read_fixed_latin1(&tag[93..97]);
        let genre = tag[127];

        // byte 125 (tag[125]) is NUL and byte 126 (tag[126]) is non-zero.
        if tag[125] == 0 && tag[126] != 0 {
            let comment = text::read_fixed_latin1(&tag[97..125]);
            return Some(Id3v1Tag::V11(Id3v11Fields {
                title,
                artist,
                album,
                year,
                comment,
                track: tag[126],
                genre,
            }));
        }

        let comment = text::read_fixed_latin1(&tag[97..127]);
        Some(Id3v1Tag::V10(Id3v10Fields {
            title,
            artist,
            album,
            year,
            comment,
            genre,
        }))
    }

    /// Serializes this tag to exactly 128 bytes.
    pub fn render(&self) -> [u8; TAG_SIZE] {
        let mut out = [0u8; TAG_SIZE];
        out[0..3].copy_from_slice(b"TAG");

        match self {
            Id3v1Tag::V10(fields) => {
                out[3..33].copy_from_slice(&text::write_fixed_latin1(&fields.title, TITLE_SIZE));
                out[33..63].copy_from_slice(&text::write_fixed_latin1(&fields.artist, ARTIST_SIZE));
                out[63..93].copy_from_slice(&text::write_fixed_latin1(&fields.album, ALBUM_SIZE));
                out[93..97].copy_from_slice(&text::write_fixed_latin1(&fields.year, YEAR_SIZE));
                out[97..127]
                    .copy_from_slice(&text::write_fixed_latin1(&fields.comment, V10_COMMENT_SIZE));
                out[127] = fields.genre;
            }

            Id3v1Tag::V11(fields) => {
                out[3..33].copy_from_slice(&text::write_fixed_latin1(&fields.title, TITLE_SIZE));
                out[33..63].copy_from_slice(&text::write_fixed_latin1(&fields.artist, ARTIST_SIZE));
                out[63..93].copy_from_slice(&text::write_fixed_latin1(&fields.album, ALBUM_SIZE));
                out[93..97].copy_from_slice(&text::write_fixed_latin1(&fields.year, YEAR_SIZE));
                out[97..125]
                    .copy_from_slice(&text::write_fixed_latin1(&fields.comment, V11_COMMENT_SIZE));
                out[125] = 0;
                out[126] = fields.track;
                out[127] = fields.genre;
            }
        }

        out
    }

    pub fn is_v11(&self) -> bool {
        matches!(self, Id3v1Tag::V11(_))
    }

    pub fn title(&self) -> &str {
        match self {
            Id3v1Tag::V10(f) => &f.title,
            Id3v1Tag::V11(f) => &f.title,
        }
    }

    pub fn artist(&self) -> &str {
        match self {
            Id3v1Tag::V10(f) => &f.artist,
            Id3v1Tag::V11(f) => &f.artist,
        }
    }

    pub fn album(&self) -> &str {
        match self {
            Id3v1Tag::V10(f) => &f.album,
            Id3v1Tag::V11(f) => &f.album,
        }
    }

    pub fn year(&self) -> &str {
        match self {
            Id3v1Tag::V10(f) => &f.year,
            Id3v1Tag::V11(f) => &f.year,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Id3v1Tag::V10(f) => &f.comment,
            Id3v1Tag::V11(f) => &f.comment,
        }
    }

    pub fn genre(&self) -> u8 {
        match self {
            Id3v1Tag::V10(f) => f.genre,
            Id3v1Tag::V11(f) => f.genre,
        }
    }

    /// The track number, if this is a 1.1 tag.
    pub fn track(&self) -> Option<u8> {
        match self {
            Id3v1Tag::V10(_) => None,
            Id3v1Tag::V11(f) => Some(f.track),
        }
    }
}

/// `(Other)` in the classic ID3v1 genre table; used as the fallback genre
/// index by the v2.4 → v1.0 conversion when no genre can be derived.
pub const GENRE_OTHER: u8 = 12;

/// Detects whether `buf` ends with an ID3v1.0 trailer specifically
/// (byte 126 is NUL, i.e. no track marker).
pub fn has_v10(buf: &[u8]) -> bool {
    matches!(Id3v1Tag::parse(buf), Some(Id3v1Tag::V10(_)))
}

/// Detects whether `buf` ends with an ID3v1.1 trailer specifically.
pub fn has_v11(buf: &[u8]) -> bool {
    matches!(Id3v1Tag::parse(buf), Some(Id3v1Tag::V11(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v11_fixture(track: u8, genre: u8) -> Vec<u8> {
        let mut buf = vec![0u8; 128];
        buf[0..3].copy_from_slice(b"TAG");
        buf[3..13].copy_from_slice(b"Title\0\0\0\0\0");
        buf[125] = 0;
        buf[126] = track;
        buf[127] = genre;
        buf
    }

    #[test]
    fn discriminates_v11() {
        let buf = v11_fixture(5, 17);
        assert!(has_v11(&buf));
        assert!(!has_v10(&buf));

        match Id3v1Tag::parse(&buf).unwrap() {
            Id3v1Tag::V11(fields) => {
                assert_eq!(fields.track, 5);
                assert_eq!(fields.genre, 17);
                assert_eq!(fields.title, "Title");
            }
            Id3v1Tag::V10(_) => panic!("expected v1.1"),
        }
    }

    #[test]
    fn tie_break_favors_v10_when_track_byte_is_nul() {
        let mut buf = v11_fixture(5, 17);
        buf[126] = 0; // clears the track marker -> falls through to v1.0
        assert!(has_v10(&buf));
        assert!(!has_v11(&buf));
    }

    #[test]
    fn round_trips_v10() {
        let tag = Id3v1Tag::V10(Id3v10Fields {
            title: "Song".into(),
            artist: "Artist".into(),
            album: "Album".into(),
            year: "2024".into(),
            comment: "Hi".into(),
            genre: 0,
        });

        let bytes = tag.render();
        assert_eq!(bytes.len(), 128);
        let parsed = Id3v1Tag::parse(&bytes).unwrap();
        assert_eq!(parsed, tag);
    }

    #[test]
    fn truncates_overlong_fields_without_error() {
        let tag = Id3v1Tag::V10(Id3v10Fields {
            title: "a".repeat(50),
            ..Default::default()
        });

        let bytes = tag.render();
        assert_eq!(text::read_fixed_latin1(&bytes[3..33]).len(), 30);
    }
}
