//! Text-encoding handling for ID3v2 frame payloads.
//!
//! ID3v2 text frames are prefixed by a single encoding byte (absent in
//! v2.0/v1, where Latin-1 is implied) whose four legal values are modeled
//! here, plus a synthetic `Utf16Le` variant for taggers that write
//! little-endian UTF-16 without an explicit BOM-less marker in the spec.

use crate::io::BufStream;
use std::fmt;

/// A text encoding as found in (or implied by) an ID3v2 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// ISO-8859-1, one byte per character, NUL-terminated with one byte.
    Latin1,
    /// UTF-16 with a leading byte-order mark, NUL-terminated with two bytes.
    Utf16,
    /// UTF-16BE without a BOM, NUL-terminated with two bytes. ID3v2.4 only.
    Utf16Be,
    /// UTF-8, NUL-terminated with one byte. ID3v2.4 only.
    Utf8,
    /// UTF-16LE without a BOM. Not part of the ID3v2 spec, but written by
    /// some taggers; always downgraded to [`Utf16`](Encoding::Utf16) on
    /// render.
    Utf16Le,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf8
    }
}

impl Encoding {
    /// The width in bytes of this encoding's NUL terminator.
    pub fn nul_size(self) -> usize {
        match self {
            Encoding::Latin1 | Encoding::Utf8 => 1,
            Encoding::Utf16 | Encoding::Utf16Be | Encoding::Utf16Le => 2,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Encoding::Latin1 => "Latin1",
            Encoding::Utf16 => "UTF-16",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Le => "UTF-16LE",
        };
        write![f, "{}", name]
    }
}

/// Reads the rest of `stream` as text in the given encoding.
pub fn read(enc: Encoding, stream: &mut BufStream) -> String {
    decode(enc, stream.take_rest())
}

/// Reads text up to (and consuming) the encoding's NUL terminator,
/// leaving the rest of the stream for the caller. If no terminator is
/// found, the rest of the stream is consumed and treated as the text.
pub fn read_terminated(enc: Encoding, stream: &mut BufStream) -> String {
    let nul_size = enc.nul_size();
    let mut i = 0;

    loop {
        match stream.peek(i..i + nul_size) {
            Ok(window) if window.iter().all(|&b| b == 0) => {
                let text = decode(enc, stream.peek(0..i).unwrap_or(&[]));
                let _ = stream.skip(i + nul_size);
                return text;
            }
            Ok(_) => i += nul_size,
            Err(_) => return decode(enc, stream.take_rest()),
        }
    }
}

/// Encodes `text` in the given encoding, without a terminator.
pub fn render(enc: Encoding, text: &str) -> Vec<u8> {
    encode(enc, text)
}

/// Encodes `text` in the given encoding, followed by its NUL terminator.
pub fn render_terminated(enc: Encoding, text: &str) -> Vec<u8> {
    let mut out = encode(enc, text);
    out.extend(std::iter::repeat(0u8).take(enc.nul_size()));
    out
}

fn decode(enc: Encoding, bytes: &[u8]) -> String {
    match enc {
        Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),

        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),

        Encoding::Utf16 => {
            if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
                decode_utf16_le(&bytes[2..])
            } else if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                decode_utf16_be(&bytes[2..])
            } else {
                // No BOM found; assume native/BE per the ID3v2 default.
                decode_utf16_be(bytes)
            }
        }

        Encoding::Utf16Be => decode_utf16_be(bytes),
        Encoding::Utf16Le => decode_utf16_le(bytes),
    }
}

fn encode(enc: Encoding, text: &str) -> Vec<u8> {
    match enc {
        Encoding::Latin1 => text.chars().map(|c| c as u32 as u8).collect(),

        Encoding::Utf8 => text.as_bytes().to_vec(),

        Encoding::Utf16 => {
            let mut out = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                out.extend(&unit.to_le_bytes());
            }
            out
        }

        Encoding::Utf16Be => {
            let mut out = Vec::new();
            for unit in text.encode_utf16() {
                out.extend(&unit.to_be_bytes());
            }
            out
        }

        Encoding::Utf16Le => {
            let mut out = Vec::new();
            for unit in text.encode_utf16() {
                out.extend(&unit.to_le_bytes());
            }
            out
        }
    }
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn decode_utf16_le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Reads a fixed-width Latin-1 text field of exactly `n` bytes, trimming
/// trailing NULs for display while the caller retains the fixed width on
/// re-emission. Used by the ID3v1 codec.
pub fn read_fixed_latin1(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    decode(Encoding::Latin1, &bytes[..end])
}

/// Writes `text` into a fixed-width Latin-1 field of exactly `n` bytes,
/// truncating if too long and NUL-padding if too short.
pub fn write_fixed_latin1(text: &str, n: usize) -> Vec<u8> {
    let mut out = encode(Encoding::Latin1, text);
    out.truncate(n);
    out.resize(n, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_id3v1_fixed_field() {
        assert_eq!(write_fixed_latin1("Hi", 5), b"Hi\0\0\0");
        assert_eq!(write_fixed_latin1("Too Long Field", 4), b"Too ");
    }

    #[test]
    fn read_id3v1_fixed_field_trims_nul() {
        assert_eq!(read_fixed_latin1(b"Hi\0\0\0"), "Hi");
    }

    #[test]
    fn utf8_round_trip() {
        let bytes = render(Encoding::Utf8, "hello");
        assert_eq!(decode(Encoding::Utf8, &bytes), "hello");
    }

    #[test]
    fn utf16_bom_round_trip() {
        let bytes = render(Encoding::Utf16, "hi");
        assert_eq!(bytes[0..2], [0xFF, 0xFE]);
        assert_eq!(decode(Encoding::Utf16, &bytes), "hi");
    }

    #[test]
    fn read_terminated_stops_at_nul() {
        let data = b"Description\0Text";
        let mut stream = BufStream::new(data);
        let desc = read_terminated(Encoding::Utf8, &mut stream);
        assert_eq!(desc, "Description");
        assert_eq!(stream.take_rest(), b"Text");
    }
}
