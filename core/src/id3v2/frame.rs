//! The ID3v2 frame codec: version-specific frame headers over an opaque
//! payload, plus a thin typed accessor layer for the canonical text and
//! comment frames.
//!
//! Frames deliberately have a single concrete representation (`id`,
//! `flags`, `payload: Vec<u8>`) rather than a trait-object hierarchy: the
//! version-specific behaviors (which id table applies, whether an
//! encoding byte is present, whether the size is synchsafe) are selected
//! by matching on [`Version`] at the call site, not by a vtable.

use crate::error::{ParseError, ParseResult};
use crate::io::BufStream;
use crate::text::{self, Encoding};
use log::{error, warn};
use regex::Regex;
use std::fmt;

use super::header::Version;

/// A frame identifier: 3 ASCII bytes for ID3v2.0, 4 for ID3v2.3/2.4.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write![f, "{}", self.0]
    }
}

impl PartialEq<str> for FrameId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FrameId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_valid_id(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_alphanumeric())
}

fn is_all_nul(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}

/// Per-frame flags. ID3v2.0 frames carry none of these (all `false`/`None`
/// on a v2.0 frame).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFlags {
    pub read_only: bool,
    pub tag_alter_preserve: bool,
    pub file_alter_preserve: bool,
    pub compressed: bool,
    pub encrypted: bool,
    /// The grouping identity byte, if the frame is part of a group. The
    /// group byte itself, if the wire format placed one in the payload,
    /// is out of scope here (grouping-payload transforms are a
    /// Non-goal); this only round-trips the flag.
    pub grouping: Option<u8>,
}

const FLAG_READ_ONLY: u8 = 0x80;
const FLAG_TAG_ALTER_PRESERVE: u8 = 0x40;
const FLAG_FILE_ALTER_PRESERVE: u8 = 0x20;
const FLAG_COMPRESSED: u8 = 0x10;
const FLAG_ENCRYPTED: u8 = 0x08;

impl FrameFlags {
    fn parse(bytes: [u8; 2]) -> Self {
        Self {
            read_only: bytes[0] & FLAG_READ_ONLY != 0,
            tag_alter_preserve: bytes[0] & FLAG_TAG_ALTER_PRESERVE != 0,
            file_alter_preserve: bytes[0] & FLAG_FILE_ALTER_PRESERVE != 0,
            compressed: bytes[0] & FLAG_COMPRESSED != 0,
            encrypted: bytes[0] & FLAG_ENCRYPTED != 0,
            grouping: if bytes[1] != 0 { Some(bytes[1]) } else { None },
        }
    }

    fn render(self) -> [u8; 2] {
        let mut byte0 = 0u8;
        if self.read_only {
            byte0 |= FLAG_READ_ONLY;
        }
        if self.tag_alter_preserve {
            byte0 |= FLAG_TAG_ALTER_PRESERVE;
        }
        if self.file_alter_preserve {
            byte0 |= FLAG_FILE_ALTER_PRESERVE;
        }
        if self.compressed {
            byte0 |= FLAG_COMPRESSED;
        }
        if self.encrypted {
            byte0 |= FLAG_ENCRYPTED;
        }

        [byte0, self.grouping.unwrap_or(0)]
    }
}

/// A single ID3v2 frame: an identifier, version-specific flags, and an
/// opaque payload. Frames whose id is not in the canonical text-frame
/// table are preserved verbatim across parse -> edit -> serialize;
/// nothing in this crate reinterprets their payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: FrameId,
    pub flags: FrameFlags,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(id: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: FrameId::new(id),
            flags: FrameFlags::default(),
            payload,
        }
    }
}

/// Reads frames from `stream` until its body is consumed or a frame with
/// an all-NUL identifier (the padding sentinel) is encountered.
///
/// A frame whose declared size overruns the remaining body, or whose id
/// is not ASCII alphanumeric, ends iteration early (the rest of the
/// stream is treated as padding) rather than failing the whole tag parse
/// — malformed trailing bytes in an otherwise-valid tag are a recoverable
/// anomaly per the error-handling policy, logged and not surfaced as a
/// hard failure.
pub fn parse_frames(stream: &mut BufStream, version: Version) -> Vec<Frame> {
    let mut frames = Vec::new();

    loop {
        if stream.is_empty() {
            break;
        }

        match parse_one(stream, version) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => break, // padding sentinel reached
            Err(err) => {
                warn!("stopping frame iteration: {}", err);
                break;
            }
        }
    }

    frames
}

fn parse_one(stream: &mut BufStream, version: Version) -> ParseResult<Option<Frame>> {
    let id_len = if version == Version::V20 { 3 } else { 4 };

    let id_bytes = stream.peek(0..id_len)?;
    if is_all_nul(id_bytes) {
        return Ok(None);
    }
    if !is_valid_id(id_bytes) {
        error!("frame identifier is not ASCII alphanumeric");
        return Err(ParseError::MalformedFrame);
    }

    let id = String::from_utf8_lossy(stream.slice(id_len)?).into_owned();

    let size = match version {
        Version::V20 => stream.read_be_u24()?,
        Version::V23 => stream.read_be_u32()?,
        Version::V24 => stream.read_synchsafe_u32()?,
    };

    let flags = match version {
        Version::V20 => FrameFlags::default(),
        Version::V23 | Version::V24 => FrameFlags::parse(stream.read_array::<2>()?),
    };

    if size as usize > stream.remaining() {
        error!("frame {} declares size {} beyond remaining tag body", id, size);
        return Err(ParseError::MalformedFrame);
    }

    let payload = stream.slice(size as usize)?.to_vec();

    Ok(Some(Frame {
        id: FrameId::new(id),
        flags,
        payload,
    }))
}

/// Serializes `frames` back to bytes for the given version.
pub fn render_frames(frames: &[Frame], version: Version) -> Vec<u8> {
    let mut out = Vec::new();

    for frame in frames {
        out.extend(frame.id.as_str().as_bytes());

        match version {
            Version::V20 => {
                let size = frame.payload.len() as u32;
                out.extend(&size.to_be_bytes()[1..4]);
            }
            Version::V23 => {
                out.extend(&(frame.payload.len() as u32).to_be_bytes());
                out.extend(&frame.flags.render());
            }
            Version::V24 => {
                out.extend(&crate::io::write_synchsafe_u32(frame.payload.len() as u32));
                out.extend(&frame.flags.render());
            }
        }

        out.extend(&frame.payload);
    }

    out
}

/// Looks up the first frame with the given id.
pub fn get_frame<'a>(frames: &'a [Frame], id: &str) -> Option<&'a Frame> {
    frames.iter().find(|f| f.id.as_str() == id)
}

fn get_frame_mut<'a>(frames: &'a mut [Frame], id: &str) -> Option<&'a mut Frame> {
    frames.iter_mut().find(|f| f.id.as_str() == id)
}

/// Replaces the first frame with `id` in place (preserving its position),
/// or appends a new frame if none exists.
pub fn set_frame(frames: &mut Vec<Frame>, id: &str, payload: Vec<u8>, flags: FrameFlags) {
    if let Some(frame) = get_frame_mut(frames, id) {
        frame.payload = payload;
        frame.flags = flags;
    } else {
        frames.push(Frame {
            id: FrameId::new(id),
            flags,
            payload,
        });
    }
}

/// Always appends a new frame, regardless of whether one with the same id
/// already exists.
pub fn add_frame(frames: &mut Vec<Frame>, frame: Frame) {
    frames.push(frame);
}

/// Removes the first frame with the given id. Returns whether one was
/// removed.
pub fn remove_frame(frames: &mut Vec<Frame>, id: &str) -> bool {
    if let Some(pos) = frames.iter().position(|f| f.id.as_str() == id) {
        frames.remove(pos);
        true
    } else {
        false
    }
}

/// The canonical frame-id mapping for the seven neutral text fields, one
/// table per ID3v2 major version.
#[derive(Debug, Clone, Copy)]
pub struct TextIds {
    pub title: &'static str,
    pub artist: &'static str,
    pub album: &'static str,
    pub year: &'static str,
    pub comment: &'static str,
    pub track: &'static str,
    pub genre: &'static str,
}

pub const V20_IDS: TextIds = TextIds {
    title: "TT2",
    artist: "TP1",
    album: "TAL",
    year: "TYE",
    comment: "COM",
    track: "TRK",
    genre: "TCO",
};

pub const V23_IDS: TextIds = TextIds {
    title: "TIT2",
    artist: "TPE1",
    album: "TALB",
    year: "TYER",
    comment: "COMM",
    track: "TRCK",
    genre: "TCON",
};

pub const V24_IDS: TextIds = TextIds {
    title: "TIT2",
    artist: "TPE1",
    album: "TALB",
    year: "TDRC",
    comment: "COMM",
    track: "TRCK",
    genre: "TCON",
};

/// ID3v2.0 text/URL frames carry no encoding byte: Latin-1 is implied.
/// ID3v2.3/2.4 prefix every text frame with one.
fn has_encoding_byte(version: Version) -> bool {
    version != Version::V20
}

fn encoding_byte(enc: Encoding) -> u8 {
    match enc {
        Encoding::Latin1 => 0x00,
        Encoding::Utf16 | Encoding::Utf16Le => 0x01,
        Encoding::Utf16Be => 0x02,
        Encoding::Utf8 => 0x03,
    }
}

fn parse_encoding_byte(byte: u8) -> Encoding {
    match byte {
        0x00 => Encoding::Latin1,
        0x01 => Encoding::Utf16,
        0x02 => Encoding::Utf16Be,
        0x03 => Encoding::Utf8,
        other => {
            warn!("unrecognized text encoding byte {:#04x}, assuming Latin-1", other);
            Encoding::Latin1
        }
    }
}

/// Reads a plain text frame's neutral string value (title/artist/album/
/// year/track).
pub fn get_text(frames: &[Frame], id: &str, version: Version) -> Option<String> {
    let frame = get_frame(frames, id)?;
    let mut stream = BufStream::new(&frame.payload);

    let enc = if has_encoding_byte(version) {
        stream.read_u8().map(parse_encoding_byte).unwrap_or(Encoding::Latin1)
    } else {
        Encoding::Latin1
    };

    Some(text::read(enc, &mut stream))
}

/// Writes a plain text frame, replacing any existing frame with the same
/// id in place (see [`set_frame`]).
pub fn set_text(frames: &mut Vec<Frame>, id: &str, value: &str, version: Version, enc: Encoding) {
    let mut payload = Vec::new();

    if has_encoding_byte(version) {
        payload.push(encoding_byte(enc));
        payload.extend(text::render(enc, value));
    } else {
        payload.extend(text::render(Encoding::Latin1, value));
    }

    set_frame(frames, id, payload, FrameFlags::default());
}

/// A decoded COMM/COM frame: language, short description, and comment
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFrame {
    pub encoding: Encoding,
    pub lang: [u8; 3],
    pub desc: String,
    pub text: String,
}

impl Default for CommentFrame {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            lang: *b"eng",
            desc: String::new(),
            text: String::new(),
        }
    }
}

/// Reads the comment frame for the given version's comment id
/// (COM/COMM), if present.
pub fn get_comment(frames: &[Frame], ids: &TextIds, version: Version) -> Option<CommentFrame> {
    let frame = get_frame(frames, ids.comment)?;
    let mut stream = BufStream::new(&frame.payload);

    let encoding = if has_encoding_byte(version) {
        stream.read_u8().map(parse_encoding_byte).unwrap_or(Encoding::Latin1)
    } else {
        Encoding::Latin1
    };

    let lang = stream.read_array::<3>().unwrap_or(*b"eng");
    let desc = text::read_terminated(encoding, &mut stream);
    let text = text::read(encoding, &mut stream);

    Some(CommentFrame {
        encoding,
        lang,
        desc,
        text,
    })
}

/// Writes the comment frame for the given version's comment id.
pub fn set_comment(frames: &mut Vec<Frame>, ids: &TextIds, version: Version, comment: &CommentFrame) {
    let mut payload = Vec::new();

    if has_encoding_byte(version) {
        payload.push(encoding_byte(comment.encoding));
    }

    payload.extend(&comment.lang);
    payload.extend(text::render_terminated(comment.encoding, &comment.desc));
    payload.extend(text::render(comment.encoding, &comment.text));

    set_frame(frames, ids.comment, payload, FrameFlags::default());
}

/// The classic ID3v1 "Other" genre index, used as a fallback when a genre
/// string can't be parsed.
pub const GENRE_OTHER: u8 = crate::id3v1::GENRE_OTHER;

/// Parses a textual genre frame value, accepting either a bare integer
/// ("17") or the historical parenthesized back-reference form ("(17)",
/// "(17)Rock"). Returns [`GENRE_OTHER`] if neither form matches.
pub fn parse_genre_string(raw: &str) -> u8 {
    let re = Regex::new(r"\(?(\d+)\)?").unwrap();

    match re.captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().parse::<u32>().unwrap_or(GENRE_OTHER as u32).min(255) as u8,
        None => GENRE_OTHER,
    }
}

/// Renders a genre index in the historical parenthesized form.
pub fn render_genre_string(genre: u8) -> String {
    format!["({})", genre]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trip_v23() {
        let mut frames = Vec::new();
        set_text(&mut frames, "TIT2", "Hello", Version::V23, Encoding::Utf8);

        let rendered = render_frames(&frames, Version::V23);
        let mut stream = BufStream::new(&rendered);
        let parsed = parse_frames(&mut stream, Version::V23);

        assert_eq!(get_text(&parsed, "TIT2", Version::V23).as_deref(), Some("Hello"));
    }

    #[test]
    fn set_frame_replaces_in_place() {
        let mut frames = vec![
            Frame::new("TIT2", b"old-payload".to_vec()),
            Frame::new("TPE1", b"artist-payload".to_vec()),
        ];

        set_frame(&mut frames, "TIT2", b"new-payload".to_vec(), FrameFlags::default());

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].id.as_str(), "TIT2");
        assert_eq!(frames[0].payload, b"new-payload");
    }

    #[test]
    fn set_frame_appends_when_absent() {
        let mut frames = vec![Frame::new("TPE1", b"artist".to_vec())];
        set_frame(&mut frames, "TIT2", b"title".to_vec(), FrameFlags::default());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].id.as_str(), "TIT2");
    }

    #[test]
    fn add_frame_always_appends() {
        let mut frames = vec![Frame::new("COMM", b"one".to_vec())];
        add_frame(&mut frames, Frame::new("COMM", b"two".to_vec()));
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn comment_frame_round_trip() {
        let mut frames = Vec::new();
        let comment = CommentFrame {
            encoding: Encoding::Utf8,
            lang: *b"eng",
            desc: String::from("Description"),
            text: String::from("Text"),
        };

        set_comment(&mut frames, &V24_IDS, Version::V24, &comment);

        let rendered = render_frames(&frames, Version::V24);
        let mut stream = BufStream::new(&rendered);
        let parsed = parse_frames(&mut stream, Version::V24);

        let round_tripped = get_comment(&parsed, &V24_IDS, Version::V24).unwrap();
        assert_eq!(round_tripped, comment);
    }

    #[test]
    fn genre_parses_bare_and_parenthesized() {
        assert_eq!(parse_genre_string("17"), 17);
        assert_eq!(parse_genre_string("(17)"), 17);
        assert_eq!(parse_genre_string("(4)Eurodisco"), 4);
        assert_eq!(parse_genre_string("garbage"), GENRE_OTHER);
    }

    #[test]
    fn malformed_frame_size_stops_iteration_without_panicking() {
        let mut bytes = Vec::new();
        bytes.extend(b"TIT2");
        bytes.extend(&0xFFFF_FFFFu32.to_be_bytes()); // size far beyond body
        bytes.extend(&[0, 0]);

        let mut stream = BufStream::new(&bytes);
        let frames = parse_frames(&mut stream, Version::V23);
        assert!(frames.is_empty());
    }

    #[test]
    fn v20_frames_have_no_encoding_byte() {
        let mut frames = Vec::new();
        set_text(&mut frames, "TT2", "Hello", Version::V20, Encoding::Utf8);
        // No encoding byte means the payload is exactly the Latin-1 bytes.
        assert_eq!(frames[0].payload, b"Hello");
    }
}
