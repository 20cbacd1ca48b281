//! Readers for tracked music modules.
//!
//! Four formats are supported: Impulse Tracker (IT), Amiga MOD with its
//! FastTracker and Startrekker variants, Scream Tracker 3 (S3M) and
//! FastTracker 2 (XM). Each reader takes the whole file as a byte slice and
//! returns an owned, fully decoded structure; nothing is played or mixed.
//!
//! ```no_run
//! let data = std::fs::read("song.it").unwrap();
//! let module = tracked::format::load(&data).unwrap();
//! println!("{} ({})", module.title(), module.format());
//! ```

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

#[macro_use]
pub mod util;

pub mod format;
pub mod module;

pub use crate::format::{load, load_from, Format};
pub use crate::module::{Event, Module};

use std::error;
use std::fmt;
use std::io;


#[derive(Debug)]
pub enum Error {
    InvalidFormat(String),
    InvalidInstrumentFormat(String),
    TruncatedInput { ofs: usize, size: usize, len: usize },
    UnsupportedVariant(String),
    OutOfRangeHeader(String),
    PositionOutOfBounds { pos: usize, len: usize },
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFormat(descr)           => write!(f, "invalid format: {}", descr),
            Error::InvalidInstrumentFormat(descr) => write!(f, "invalid instrument: {}", descr),
            Error::TruncatedInput { ofs, size, len } =>
                write!(f, "truncated input: read of {} bytes at {:#x} exceeds length {:#x}", size, ofs, len),
            Error::UnsupportedVariant(descr)      => write!(f, "unsupported variant: {}", descr),
            Error::OutOfRangeHeader(descr)        => write!(f, "header value out of range: {}", descr),
            Error::PositionOutOfBounds { pos, len } =>
                write!(f, "position {} out of bounds (length {})", pos, len),
            Error::Io(err)                        => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _              => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let e = Error::TruncatedInput { ofs: 16, size: 4, len: 18 };
        assert_eq!(e.to_string(), "truncated input: read of 4 bytes at 0x10 exceeds length 0x12");
        let e = Error::PositionOutOfBounds { pos: 9, len: 8 };
        assert_eq!(e.to_string(), "position 9 out of bounds (length 8)");
        assert!(e.source().is_none());
    }

    #[test]
    fn test_io_error_source() {
        let e: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.source().is_some());
    }
}
