//! The neutral container holding at most one ID3v1 dialect and at most
//! one ID3v2 dialect, plus the v2.4 -> v1.0 projection.

use crate::id3v1::{Id3v10Fields, Id3v1Tag, GENRE_OTHER};
use crate::id3v2::Id3v2Tag;

/// Holds zero or one ID3v1 tag and zero or one ID3v2 tag. The two slots
/// are independent: clearing one never affects the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub v1: Option<Id3v1Tag>,
    pub v2: Option<Id3v2Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.v1.is_none() && self.v2.is_none()
    }

    /// Projects the fields of an ID3v2.4 tag (title/artist/album/year/
    /// comment) onto a fresh ID3v1.0 tag, truncating each to its fixed
    /// field width. Genre defaults to [`GENRE_OTHER`] since ID3v1 has no
    /// textual genre to carry over. Does nothing if `self.v2` is absent
    /// or is not a v2.4 tag.
    pub fn convert_v24_to_v10(&mut self) {
        let v2 = match &self.v2 {
            Some(tag @ Id3v2Tag::V24(_)) => tag,
            _ => return,
        };

        let title = v2.title().unwrap_or_default();
        let artist = v2.artist().unwrap_or_default();
        let album = v2.album().unwrap_or_default();
        let year = v2.year().unwrap_or_default();
        let comment = v2.comment().map(|c| c.text).unwrap_or_default();

        self.v1 = Some(Id3v1Tag::V10(Id3v10Fields {
            title,
            artist,
            album,
            year,
            comment,
            genre: GENRE_OTHER,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3v2::frame::CommentFrame;
    use crate::id3v2::Id3v24Body;
    use crate::text::Encoding;

    #[test]
    fn empty_tagset_is_empty() {
        assert!(TagSet::new().is_empty());
    }

    #[test]
    fn convert_v24_to_v10_truncates_and_defaults_genre() {
        let mut v2 = Id3v2Tag::V24(Id3v24Body::default());
        v2.set_title(&"a".repeat(50));
        v2.set_artist("Artist");
        v2.set_album("Album");
        v2.set_year("2024");
        v2.set_comment(&CommentFrame {
            encoding: Encoding::Utf8,
            lang: *b"eng",
            desc: String::new(),
            text: String::from("A comment"),
        });

        let mut tags = TagSet {
            v1: None,
            v2: Some(v2),
        };
        tags.convert_v24_to_v10();

        match tags.v1.as_ref().unwrap() {
            Id3v1Tag::V10(fields) => {
                assert_eq!(fields.title.len(), 50); // untruncated in the neutral model
                assert_eq!(fields.artist, "Artist");
                assert_eq!(fields.year, "2024");
                assert_eq!(fields.genre, GENRE_OTHER);
                assert_eq!(fields.comment, "A comment");
            }
            Id3v1Tag::V11(_) => panic!("expected v1.0"),
        }

        // Field-width truncation happens at render time, not projection time.
        let rendered = tags.v1.as_ref().unwrap().render();
        assert_eq!(&rendered[3..33], "a".repeat(30).as_bytes());
    }

    #[test]
    fn convert_no_op_without_v24() {
        let mut tags = TagSet::new();
        tags.convert_v24_to_v10();
        assert!(tags.v1.is_none());
    }
}
