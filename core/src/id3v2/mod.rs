//! The ID3v2 tag: a 10-byte header, optional v2.3 extended header, a list
//! of frames, and an optional v2.4 footer.
//!
//! Each major version is a distinct concrete body rather than a single
//! struct with "maybe this field applies" flags, so a v2.0 tag simply
//! cannot carry an extended header or footer at the type level.

pub mod frame;
pub mod header;

use crate::error::{ParseResult, SaveError, SaveResult};
use crate::io::BufStream;
use frame::{CommentFrame, Frame, TextIds, V20_IDS, V23_IDS, V24_IDS};
pub use header::Version;
use header::{ExtendedHeader, Footer, Id3v2Header, FOOTER_SIZE};

const HEADER_SIZE: usize = 10;

/// An ID3v2.0 tag body: header fields plus frames, neither an extended
/// header nor a footer (both postdate this version).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v20Body {
    pub revision: u8,
    pub unsynchronized: bool,
    pub frames: Vec<Frame>,
}

/// An ID3v2.3 tag body: the only version in this implementation's scope
/// that may carry an [`ExtendedHeader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v23Body {
    pub revision: u8,
    pub unsynchronized: bool,
    pub experimental: bool,
    pub extended_header: Option<ExtendedHeader>,
    pub frames: Vec<Frame>,
}

/// An ID3v2.4 tag body: the only version in this implementation's scope
/// that may carry a trailing [`Footer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v24Body {
    pub revision: u8,
    pub unsynchronized: bool,
    pub experimental: bool,
    pub has_footer: bool,
    pub frames: Vec<Frame>,
}

/// A tagged union over the three ID3v2 major versions in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Id3v2Tag {
    V20(Id3v20Body),
    V23(Id3v23Body),
    V24(Id3v24Body),
}

impl Id3v2Tag {
    pub fn version(&self) -> Version {
        match self {
            Id3v2Tag::V20(_) => Version::V20,
            Id3v2Tag::V23(_) => Version::V23,
            Id3v2Tag::V24(_) => Version::V24,
        }
    }

    fn frames(&self) -> &[Frame] {
        match self {
            Id3v2Tag::V20(b) => &b.frames,
            Id3v2Tag::V23(b) => &b.frames,
            Id3v2Tag::V24(b) => &b.frames,
        }
    }

    fn frames_mut(&mut self) -> &mut Vec<Frame> {
        match self {
            Id3v2Tag::V20(b) => &mut b.frames,
            Id3v2Tag::V23(b) => &mut b.frames,
            Id3v2Tag::V24(b) => &mut b.frames,
        }
    }

    fn ids(&self) -> &'static TextIds {
        match self {
            Id3v2Tag::V20(_) => &V20_IDS,
            Id3v2Tag::V23(_) => &V23_IDS,
            Id3v2Tag::V24(_) => &V24_IDS,
        }
    }

    /// Parses a complete ID3v2 tag (header through footer, if any) from
    /// the start of `buf`.
    pub fn parse(buf: &[u8]) -> ParseResult<Self> {
        let mut stream = BufStream::new(buf);
        let header = Id3v2Header::parse(&mut stream)?;

        let mut body_stream = stream.slice_stream(header.size as usize)?;

        let tag = match header.version {
            Version::V20 => {
                let frames = frame::parse_frames(&mut body_stream, Version::V20);
                Id3v2Tag::V20(Id3v20Body {
                    revision: header.revision,
                    unsynchronized: header.unsynchronized,
                    frames,
                })
            }

            Version::V23 => {
                let extended_header = if header.has_extended_header {
                    Some(ExtendedHeader::parse(&mut body_stream)?)
                } else {
                    None
                };

                let frames = frame::parse_frames(&mut body_stream, Version::V23);

                Id3v2Tag::V23(Id3v23Body {
                    revision: header.revision,
                    unsynchronized: header.unsynchronized,
                    experimental: header.experimental,
                    extended_header,
                    frames,
                })
            }

            Version::V24 => {
                let frames = frame::parse_frames(&mut body_stream, Version::V24);

                if header.has_footer {
                    let _ = Footer::parse(&mut stream)?;
                }

                Id3v2Tag::V24(Id3v24Body {
                    revision: header.revision,
                    unsynchronized: header.unsynchronized,
                    experimental: header.experimental,
                    has_footer: header.has_footer,
                    frames,
                })
            }
        };

        Ok(tag)
    }

    /// Serializes the complete tag (header through footer, if any).
    /// Every size field is computed fresh from the rendered frames; a
    /// stale size is never reused across an edit.
    pub fn render(&self) -> SaveResult<Vec<u8>> {
        let mut body = Vec::new();

        let (extended_header, has_footer) = match self {
            Id3v2Tag::V20(_) => (None, false),
            Id3v2Tag::V23(b) => (b.extended_header.as_ref(), false),
            Id3v2Tag::V24(b) => (None, b.has_footer),
        };

        if let Some(ext) = extended_header {
            body.extend(ext.render());
        }

        body.extend(frame::render_frames(self.frames(), self.version()));

        if body.len() > 0x0FFF_FFFF {
            return Err(SaveError::TooLarge);
        }

        let header = Id3v2Header {
            version: self.version(),
            revision: self.revision(),
            unsynchronized: self.unsynchronized(),
            experimental: self.experimental(),
            has_extended_header: extended_header.is_some(),
            has_footer,
            size: body.len() as u32,
        };

        let mut out = Vec::with_capacity(HEADER_SIZE + body.len() + FOOTER_SIZE);
        out.extend(header.render());
        out.extend(body);

        if has_footer {
            out.extend(Footer::from_header(&header).render());
        }

        Ok(out)
    }

    fn revision(&self) -> u8 {
        match self {
            Id3v2Tag::V20(b) => b.revision,
            Id3v2Tag::V23(b) => b.revision,
            Id3v2Tag::V24(b) => b.revision,
        }
    }

    fn unsynchronized(&self) -> bool {
        match self {
            Id3v2Tag::V20(b) => b.unsynchronized,
            Id3v2Tag::V23(b) => b.unsynchronized,
            Id3v2Tag::V24(b) => b.unsynchronized,
        }
    }

    fn experimental(&self) -> bool {
        match self {
            Id3v2Tag::V20(_) => false,
            Id3v2Tag::V23(b) => b.experimental,
            Id3v2Tag::V24(b) => b.experimental,
        }
    }

    pub fn title(&self) -> Option<String> {
        frame::get_text(self.frames(), self.ids().title, self.version())
    }

    pub fn set_title(&mut self, value: &str) {
        let (ids, version) = (self.ids(), self.version());
        frame::set_text(self.frames_mut(), ids.title, value, version, crate::text::Encoding::Utf8);
    }

    pub fn artist(&self) -> Option<String> {
        frame::get_text(self.frames(), self.ids().artist, self.version())
    }

    pub fn set_artist(&mut self, value: &str) {
        let (ids, version) = (self.ids(), self.version());
        frame::set_text(self.frames_mut(), ids.artist, value, version, crate::text::Encoding::Utf8);
    }

    pub fn album(&self) -> Option<String> {
        frame::get_text(self.frames(), self.ids().album, self.version())
    }

    pub fn set_album(&mut self, value: &str) {
        let (ids, version) = (self.ids(), self.version());
        frame::set_text(self.frames_mut(), ids.album, value, version, crate::text::Encoding::Utf8);
    }

    pub fn year(&self) -> Option<String> {
        frame::get_text(self.frames(), self.ids().year, self.version())
    }

    pub fn set_year(&mut self, value: &str) {
        let (ids, version) = (self.ids(), self.version());
        frame::set_text(self.frames_mut(), ids.year, value, version, crate::text::Encoding::Utf8);
    }

    pub fn track(&self) -> Option<String> {
        frame::get_text(self.frames(), self.ids().track, self.version())
    }

    pub fn set_track(&mut self, value: &str) {
        let (ids, version) = (self.ids(), self.version());
        frame::set_text(self.frames_mut(), ids.track, value, version, crate::text::Encoding::Utf8);
    }

    pub fn comment(&self) -> Option<CommentFrame> {
        frame::get_comment(self.frames(), self.ids(), self.version())
    }

    pub fn set_comment(&mut self, comment: &CommentFrame) {
        let (ids, version) = (*self.ids(), self.version());
        frame::set_comment(self.frames_mut(), &ids, version, comment);
    }

    /// The genre as a raw ID3v1-style index, parsed out of the textual
    /// genre frame (see [`frame::parse_genre_string`]).
    pub fn genre(&self) -> Option<u8> {
        let raw = frame::get_text(self.frames(), self.ids().genre, self.version())?;
        Some(frame::parse_genre_string(&raw))
    }

    pub fn set_genre(&mut self, genre: u8) {
        let rendered = frame::render_genre_string(genre);
        let (ids, version) = (self.ids(), self.version());
        frame::set_text(self.frames_mut(), ids.genre, &rendered, version, crate::text::Encoding::Utf8);
    }

    pub fn get_frame(&self, id: &str) -> Option<&Frame> {
        frame::get_frame(self.frames(), id)
    }

    pub fn add_frame(&mut self, f: Frame) {
        frame::add_frame(self.frames_mut(), f)
    }

    pub fn remove_frame(&mut self, id: &str) -> bool {
        frame::remove_frame(self.frames_mut(), id)
    }
}

/// Detects an ID3v2 header of the given major version at the start of
/// `buf`, without decoding any frames.
fn has_version(buf: &[u8], version: Version) -> bool {
    let mut stream = BufStream::new(buf);
    match Id3v2Header::parse(&mut stream) {
        Ok(header) => header.version == version,
        Err(_) => false,
    }
}

pub fn has_v20(buf: &[u8]) -> bool {
    has_version(buf, Version::V20)
}

pub fn has_v23(buf: &[u8]) -> bool {
    has_version(buf, Version::V23)
}

pub fn has_v24(buf: &[u8]) -> bool {
    has_version(buf, Version::V24)
}

/// Returns the total on-disk length of the ID3v2 tag at the start of
/// `buf` (header + body + footer), if one is present.
pub fn tag_size(buf: &[u8]) -> Option<usize> {
    let mut stream = BufStream::new(buf);
    let header = Id3v2Header::parse(&mut stream).ok()?;
    let footer = if header.has_footer { FOOTER_SIZE } else { 0 };
    Some(HEADER_SIZE + header.size as usize + footer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Encoding;

    fn v23_with_title(title: &str) -> Id3v2Tag {
        let mut tag = Id3v2Tag::V23(Id3v23Body::default());
        tag.set_title(title);
        tag
    }

    #[test]
    fn v23_title_round_trip() {
        let tag = v23_with_title("Song Title");
        let rendered = tag.render().unwrap();
        let parsed = Id3v2Tag::parse(&rendered).unwrap();
        assert_eq!(parsed.title().as_deref(), Some("Song Title"));
        assert_eq!(parsed.version(), Version::V23);
    }

    #[test]
    fn v24_with_footer_round_trip() {
        let mut tag = Id3v2Tag::V24(Id3v24Body {
            has_footer: true,
            ..Default::default()
        });
        tag.set_artist("Artist Name");

        let rendered = tag.render().unwrap();
        assert!(has_v24(&rendered));
        assert_eq!(tag_size(&rendered), Some(rendered.len()));

        let parsed = Id3v2Tag::parse(&rendered).unwrap();
        assert_eq!(parsed.artist().as_deref(), Some("Artist Name"));
    }

    #[test]
    fn genre_round_trips_through_textual_form() {
        let mut tag = Id3v2Tag::V23(Id3v23Body::default());
        tag.set_genre(17);
        assert_eq!(tag.genre(), Some(17));
    }

    #[test]
    fn comment_round_trip_via_accessor() {
        let mut tag = Id3v2Tag::V23(Id3v23Body::default());
        let comment = CommentFrame {
            encoding: Encoding::Utf8,
            lang: *b"eng",
            desc: String::new(),
            text: String::from("A comment"),
        };
        tag.set_comment(&comment);

        let rendered = tag.render().unwrap();
        let parsed = Id3v2Tag::parse(&rendered).unwrap();
        assert_eq!(parsed.comment().unwrap().text, "A comment");
    }

    #[test]
    fn detects_version_without_decoding_frames() {
        let tag = v23_with_title("X");
        let rendered = tag.render().unwrap();
        assert!(has_v23(&rendered));
        assert!(!has_v24(&rendered));
        assert!(!has_v20(&rendered));
    }
}
