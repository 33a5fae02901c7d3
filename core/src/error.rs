//! Error types shared by every codec in this crate.

use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;

/// The result of a tag/header/frame parse.
pub type ParseResult<T> = Result<T, ParseError>;

/// The result of serializing a tag back to bytes or to disk.
pub type SaveResult<T> = Result<T, SaveError>;

/// Failure kinds surfaced by the parse (read) side of the codec.
///
/// Detection predicates (`has_v10`, `has_v24`, ...) never return one of
/// these; an unparseable region is simply reported as absent. These are
/// only produced once a caller asks to actually decode a region that
/// claimed to be present.
#[derive(Debug)]
pub enum ParseError {
    /// The underlying file or buffer could not be read.
    Io(io::Error),
    /// Fewer bytes remained than a fixed-width field required.
    Truncated,
    /// A synchsafe integer had the top bit set in one of its bytes.
    MalformedSynchsafe,
    /// An expected magic ("ID3", "TAG", "3DI") was not present.
    InvalidMagic,
    /// The ID3v2 major version was outside {2, 3, 4}.
    UnsupportedVersion(u8),
    /// A frame's declared size overran the remaining tag body, or its
    /// identifier was not ASCII alphanumeric.
    MalformedFrame,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write![f, "{}", err],
            Self::Truncated => write![f, "buffer truncated before a fixed-width field"],
            Self::MalformedSynchsafe => write![f, "synchsafe integer had a set high bit"],
            Self::InvalidMagic => write![f, "expected magic was not present"],
            Self::UnsupportedVersion(major) => write![f, "unsupported ID3v2 major version {}", major],
            Self::MalformedFrame => write![f, "frame size or identifier was malformed"],
        }
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(other: io::Error) -> Self {
        Self::Io(other)
    }
}

/// Failure kinds surfaced by the write (save) side of the codec.
#[derive(Debug)]
pub enum SaveError {
    /// The underlying file could not be written.
    Io(io::Error),
    /// The serialized tag body would not fit in a 28-bit synchsafe size.
    TooLarge,
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write![f, "{}", err],
            Self::TooLarge => write![f, "tag body is too large to encode in a synchsafe size"],
        }
    }
}

impl error::Error for SaveError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SaveError {
    fn from(other: io::Error) -> Self {
        Self::Io(other)
    }
}
