//! Error types for textspan.

use std::fmt;

/// Errors that can occur while building, indexing or decoding text.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred while reading the underlying source.
    Io(std::io::Error),

    /// A range was outside the addressable content.
    OutOfRange {
        /// The offending index or end-of-range position.
        index: usize,
        /// The number of addressable bytes.
        len: usize,
    },

    /// An index past the available content was requested and the source
    /// is exhausted. Distinct from [`Error::OutOfRange`]: the request was
    /// well-formed, the data simply ended first.
    EndOfData,

    /// Malformed numeric text on a mandatory parse.
    Format {
        /// Description of what was malformed.
        message: &'static str,
    },

    /// A byte sequence could not be decoded under the active encoding.
    Decode {
        /// Description of the malformed sequence.
        message: &'static str,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::OutOfRange { index, len } => {
                write!(f, "out of range: index {} (len {})", index, len)
            }
            Error::EndOfData => write!(f, "end of data"),
            Error::Format { message } => write!(f, "format error: {}", message),
            Error::Decode { message } => write!(f, "decode error: {}", message),
            Error::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
