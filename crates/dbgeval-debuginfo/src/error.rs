//! Errors raised while reading or writing a container.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a debug-info container (bad magic)")]
    BadMagic,

    #[error("unsupported container version {0}")]
    UnsupportedVersion(u16),

    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid UTF-8 in string table entry at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("string id {0} is out of range")]
    StringIdOutOfRange(u32),

    #[error("{what} table has {count} entries, more than the supported maximum")]
    TableTooLarge { what: &'static str, count: u32 },

    #[error("string of {0} bytes exceeds the supported maximum")]
    StringTooLong(u32),

    #[error("{0} trailing bytes after the class table")]
    TrailingBytes(usize),

    #[error("malformed type descriptor '{0}'")]
    BadDescriptor(String),

    #[error("malformed class name '{0}'")]
    BadClassName(String),
}
