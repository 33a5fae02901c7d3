//! CLI-level error type shared by every subcommand handler.

use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum OpError {
    Io(io::Error),
    /// The positional source-directory argument did not exist or was
    /// not a directory.
    InvalidSourceDir(PathBuf),
}

impl Display for OpError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write![f, "{}", err],
            Self::InvalidSourceDir(path) => {
                write![f, "\"{}\" is not a directory", path.display()]
            }
        }
    }
}

impl error::Error for OpError {}

impl From<io::Error> for OpError {
    fn from(other: io::Error) -> Self {
        Self::Io(other)
    }
}
