//! Configuration for readers and writers.
//!
//! - [`ReaderOptions`]: structural characters and the read chunk size
//! - [`WriterOptions`]: structural characters, output buffering and the comment marker
//!
//! ## Examples
//!
//! ```rust
//! use keyval::{ReaderOptions, Separator, Syntax, WriterOptions};
//!
//! let syntax = Syntax::new().with_separator(Separator::Slash);
//!
//! let reader = ReaderOptions::new().with_syntax(syntax.clone()).with_buffer_size(4096);
//! assert_eq!(reader.buffer_size, 4096);
//!
//! let writer = WriterOptions::new().with_syntax(syntax).with_buffer_size(1 << 16);
//! assert_eq!(writer.buffer_size, 1 << 16);
//! ```

use crate::Syntax;

/// Default size of a single read from the underlying source: 256 KiB.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1 << 18;

/// Configuration of a [`Reader`](crate::Reader).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderOptions {
    pub syntax: Syntax,
    /// Bytes requested from the source per read. Zero is treated as one.
    pub buffer_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            syntax: Syntax::default(),
            buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ReaderOptions {
    /// Creates default options (default syntax, 256 KiB reads).
    ///
    /// ```rust
    /// use keyval::ReaderOptions;
    ///
    /// assert_eq!(ReaderOptions::new().buffer_size, 256 * 1024);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}

/// Configuration of a [`Writer`](crate::Writer).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WriterOptions {
    pub syntax: Syntax,
    /// Output is collected and written in chunks of this size. Zero writes
    /// every fragment immediately.
    pub buffer_size: usize,
    /// Render comments with the alternate comment marker of the syntax.
    pub use_alt_comment: bool,
}

impl WriterOptions {
    /// Creates default options (default syntax, unbuffered, primary comment marker).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Writes comments with the alternate marker, when the syntax has one.
    ///
    /// ```rust
    /// use keyval::{to_string_with_options, Record, Syntax, WriterOptions};
    ///
    /// let options = WriterOptions::new()
    ///     .with_syntax(Syntax::new().with_alt_comment(b';'))
    ///     .with_alt_comment(true);
    /// let text = to_string_with_options(&[Record::comment_only("note")], options).unwrap();
    /// assert_eq!(text, "; note\n");
    /// ```
    #[must_use]
    pub fn with_alt_comment(mut self, enabled: bool) -> Self {
        self.use_alt_comment = enabled;
        self
    }

    pub(crate) fn comment_marker(&self) -> u8 {
        match self.syntax.alt_comment {
            Some(alt) if self.use_alt_comment => alt,
            _ => self.syntax.comment,
        }
    }
}
