//! `MpegFile`: owns a file's raw bytes, detects which tag dialects are
//! present, and splices newly serialized tag regions back into the
//! buffer without disturbing the MPEG audio payload between them.

use std::fs;
use std::path::Path;

use crate::error::{ParseResult, SaveResult};
use crate::id3v1::Id3v1Tag;
use crate::id3v2::{self, Id3v2Tag};
use crate::io;
use crate::tagset::TagSet;

const V1_TAG_SIZE: usize = 128;

/// An in-memory MPEG audio file: a byte buffer plus enough structure to
/// locate its ID3v1 suffix and ID3v2 prefix.
pub struct MpegFile {
    buf: Vec<u8>,
}

impl MpegFile {
    /// Reads `path` fully into memory.
    pub fn load(path: impl AsRef<Path>) -> ParseResult<Self> {
        let buf = fs::read(path)?;
        Ok(Self { buf })
    }

    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Writes the current buffer back to `path` in full (used when no
    /// tag region changed length and a plain overwrite is simplest).
    pub fn save(&self, path: impl AsRef<Path>) -> SaveResult<()> {
        fs::write(path, &self.buf)?;
        Ok(())
    }

    pub fn has_v10(&self) -> bool {
        crate::id3v1::has_v10(&self.buf)
    }

    pub fn has_v11(&self) -> bool {
        crate::id3v1::has_v11(&self.buf)
    }

    pub fn has_v20(&self) -> bool {
        id3v2::has_v20(&self.buf)
    }

    pub fn has_v23(&self) -> bool {
        id3v2::has_v23(&self.buf)
    }

    pub fn has_v24(&self) -> bool {
        id3v2::has_v24(&self.buf)
    }

    pub fn has_v2(&self) -> bool {
        self.has_v20() || self.has_v23() || self.has_v24()
    }

    pub fn has_v1(&self) -> bool {
        self.has_v10() || self.has_v11()
    }

    /// The start of the MPEG audio region: past the ID3v2 prefix if one
    /// is present, otherwise 0.
    fn v2_prefix_len(&self) -> usize {
        id3v2::tag_size(&self.buf).unwrap_or(0)
    }

    /// The end of the MPEG audio region: before the ID3v1 suffix if one
    /// is present, otherwise the buffer length.
    fn v1_suffix_start(&self) -> usize {
        if self.has_v1() {
            self.buf.len() - V1_TAG_SIZE
        } else {
            self.buf.len()
        }
    }

    /// Parses whichever tags are present into a [`TagSet`]. The v1 slot
    /// prefers a v1.1 trailer over v1.0; the v2 slot holds the
    /// highest-numbered variant present (2.4 > 2.3 > 2.0).
    pub fn get_tags(&self) -> ParseResult<TagSet> {
        let v1 = if self.has_v1() {
            Id3v1Tag::parse(&self.buf)
        } else {
            None
        };

        let v2 = if self.has_v2() {
            Some(Id3v2Tag::parse(&self.buf)?)
        } else {
            None
        };

        Ok(TagSet { v1, v2 })
    }

    /// Rewrites both tag regions from `tags`, preserving the MPEG audio
    /// payload byte-exact. Both slots are always rewritten from
    /// scratch: a `None` slot strips the corresponding region entirely.
    pub fn set_tags(&mut self, tags: &TagSet) -> SaveResult<()> {
        let body_start = self.v2_prefix_len();
        let body_end = self.v1_suffix_start();
        let audio = self.buf[body_start..body_end].to_vec();

        let mut out = Vec::with_capacity(self.buf.len());

        if let Some(v2) = &tags.v2 {
            out.extend(v2.render()?);
        }

        out.extend(audio);

        if let Some(v1) = &tags.v1 {
            out.extend(v1.render());
        }

        self.buf = out;
        Ok(())
    }

    /// Strips both tag regions. Equivalent to `set_tags(&TagSet::new())`.
    pub fn remove_tags(&mut self) -> SaveResult<()> {
        self.set_tags(&TagSet::new())
    }

    /// Removes only the ID3v1 suffix, leaving any ID3v2 prefix and the
    /// audio payload byte-exact. Returns whether a suffix was present.
    /// A direct byte-level splice rather than a `get_tags`/`set_tags`
    /// round-trip, so it never depends on the v2 prefix parsing cleanly.
    pub fn strip_v1(&mut self) -> bool {
        if !self.has_v1() {
            return false;
        }

        let end = self.v1_suffix_start();
        self.buf.truncate(end);
        true
    }

    /// Removes only the ID3v2 prefix, leaving any ID3v1 suffix and the
    /// audio payload byte-exact. Returns whether a prefix was present.
    pub fn strip_v2(&mut self) -> bool {
        if !self.has_v2() {
            return false;
        }

        let start = self.v2_prefix_len();
        self.buf.drain(0..start);
        true
    }

    /// Persists the buffer to `path`, splicing in place when the tag
    /// regions haven't changed length and rewriting the whole file
    /// otherwise.
    pub fn save_spliced(&self, path: impl AsRef<Path>, original_len: u64) -> SaveResult<()> {
        io::write_replaced(path, &self.buf, original_len)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3v1::Id3v10Fields;
    use crate::id3v2::Id3v23Body;

    fn v1_trailer() -> Vec<u8> {
        Id3v1Tag::V10(Id3v10Fields {
            title: "Song".into(),
            ..Default::default()
        })
        .render()
        .to_vec()
    }

    #[test]
    fn detects_v1_and_parses_it() {
        let mut buf = vec![0xFFu8; 10];
        buf.extend(v1_trailer());

        let file = MpegFile::from_bytes(buf);
        assert!(file.has_v1());
        assert!(!file.has_v2());

        let tags = file.get_tags().unwrap();
        assert_eq!(tags.v1.unwrap().title(), "Song");
    }

    #[test]
    fn remove_tags_yields_only_audio_region() {
        let audio = vec![0xFFu8; 20];
        let mut buf = Vec::new();

        let mut v2 = Id3v2Tag::V23(Id3v23Body::default());
        v2.set_title("Hi");
        buf.extend(v2.render().unwrap());
        buf.extend(&audio);
        buf.extend(v1_trailer());

        let mut file = MpegFile::from_bytes(buf);
        assert!(file.has_v2());
        assert!(file.has_v1());

        file.remove_tags().unwrap();
        assert_eq!(file.as_bytes(), &audio[..]);
    }

    #[test]
    fn set_tags_preserves_audio_region_byte_exact() {
        let audio = vec![0xAAu8; 50];
        let mut file = MpegFile::from_bytes(audio.clone());

        let mut v2 = Id3v2Tag::V23(Id3v23Body::default());
        v2.set_artist("Someone");

        file.set_tags(&TagSet {
            v1: None,
            v2: Some(v2),
        })
        .unwrap();

        let tags = file.get_tags().unwrap();
        assert_eq!(tags.v2.unwrap().artist().as_deref(), Some("Someone"));

        let prefix_len = id3v2::tag_size(file.as_bytes()).unwrap();
        assert_eq!(&file.as_bytes()[prefix_len..], &audio[..]);
    }

    #[test]
    fn strip_v1_leaves_v2_and_audio_untouched() {
        let audio = vec![0x11u8; 30];
        let mut v2 = Id3v2Tag::V23(Id3v23Body::default());
        v2.set_title("Hi");
        let v2_bytes = v2.render().unwrap();

        let mut buf = v2_bytes.clone();
        buf.extend(&audio);
        buf.extend(v1_trailer());

        let mut file = MpegFile::from_bytes(buf);
        assert!(file.strip_v1());
        assert!(!file.has_v1());
        assert!(file.has_v2());
        assert_eq!(&file.as_bytes()[..v2_bytes.len()], &v2_bytes[..]);
        assert_eq!(&file.as_bytes()[v2_bytes.len()..], &audio[..]);
    }

    #[test]
    fn strip_v2_leaves_v1_and_audio_untouched() {
        let audio = vec![0x22u8; 30];
        let mut v2 = Id3v2Tag::V23(Id3v23Body::default());
        v2.set_title("Hi");

        let mut buf = v2.render().unwrap();
        buf.extend(&audio);
        buf.extend(v1_trailer());

        let mut file = MpegFile::from_bytes(buf);
        assert!(file.strip_v2());
        assert!(!file.has_v2());
        assert!(file.has_v1());
        assert_eq!(&file.as_bytes()[..audio.len()], &audio[..]);
    }

    #[test]
    fn idempotent_remove() {
        let mut buf = v1_trailer();
        buf.splice(0..0, vec![0xFFu8; 5]);

        let mut file = MpegFile::from_bytes(buf);
        file.remove_tags().unwrap();
        let once = file.as_bytes().to_vec();
        file.remove_tags().unwrap();
        assert_eq!(file.as_bytes(), &once[..]);
    }
}
