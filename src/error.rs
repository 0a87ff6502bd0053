//! Error types for reading and writing keyval streams.
//!
//! ## Error Categories
//!
//! - **Transport**: the underlying source or sink failed ([`Error::Io`])
//! - **Length mismatch**: the sink accepted fewer bytes than it was given ([`Error::ShortWrite`])
//! - **Content**: a finished field is not UTF-8 ([`Error::InvalidUtf8`])
//! - **Caller errors**: a record the format cannot express, or an unusable [`Syntax`](crate::Syntax)
//! - **Convenience layer**: [`Error::Incomplete`] and [`Error::NoProgress`] are produced only by
//!   [`from_reader`](crate::from_reader) and friends; the [`Reader`](crate::Reader) itself reports
//!   these conditions as [`Decoded`](crate::Decoded) statuses.
//!
//! Transport, length-mismatch and content errors are sticky: once a reader or
//! writer returns one, every later call returns a clone of the same error.
//!
//! ## Examples
//!
//! ```rust
//! use keyval::{from_str, Error};
//!
//! let result = from_str("[unterminated");
//! assert!(matches!(result, Err(Error::Incomplete)));
//! ```

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Represents all possible errors of the keyval codec.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The underlying byte source or sink failed.
    #[error("IO error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// The sink reported writing fewer bytes than it was given.
    #[error("write failed: byte count does not match (expected {expected}, written {written})")]
    ShortWrite { expected: usize, written: usize },

    /// The stream ended inside a section declaration or after a dangling escape.
    #[error("EOF: incomplete data")]
    Incomplete,

    /// The source returned no data without reaching its end.
    #[error("no progress: the source returned no data")]
    NoProgress,

    /// A decoded field is not valid UTF-8.
    #[error("invalid UTF-8 in decoded field: {0}")]
    InvalidUtf8(String),

    /// A record that the format cannot express.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Structural characters that are not ASCII or that collide.
    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),
}

impl Error {
    /// Wraps a transport error.
    ///
    /// ```rust
    /// use keyval::Error;
    /// use std::io;
    ///
    /// let err = Error::io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
    /// assert!(err.to_string().contains("gone"));
    /// ```
    pub fn io(err: io::Error) -> Self {
        Error::Io(Arc::new(err))
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Error::InvalidRecord(msg.into())
    }

    pub fn invalid_syntax(msg: impl Into<String>) -> Self {
        Error::InvalidSyntax(msg.into())
    }

    /// Returns the kind of the wrapped transport error, if this is one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// True when both values are the same error, the same cached transport
    /// error included.
    ///
    /// Transport errors compare by identity, every other variant by value.
    pub fn is_same(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Io(a), Error::Io(b)) => Arc::ptr_eq(a, b),
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
