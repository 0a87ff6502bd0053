//! # keyval
//!
//! A streaming codec for keyval, a human-readable, hierarchical text format in
//! the INI family with an exact escaping and continuation grammar.
//!
//! ## What is keyval?
//!
//! ```text
//! # database connection
//! [db.primary]
//! host = localhost
//! port = 5432
//! ```
//!
//! Every entry is a [`Record`]: a comment, a key made of segments, and a
//! value. Section declarations prefix the keys that follow them; comments
//! apply to the entries that follow them. Values are untyped text.
//!
//! ## Key Features
//!
//! - **Streaming**: the decoder consumes input one byte at a time and works
//!   the same for any chunking of the input, one byte per read included
//! - **Exact round trips**: every escaping decision of the encoder is undone by
//!   the decoder, including leading and trailing whitespace
//! - **Truncation detection**: a stream cut inside a section declaration or
//!   after an escape marker ends [`Decoded::IncompleteEnd`], not
//!   [`Decoded::CleanEnd`]
//! - **Non-blocking friendly**: a source without data is reported as
//!   [`Decoded::NoProgress`] and the call can be retried
//! - **Minimal output**: the encoder only writes comments and sections when
//!   they change
//!
//! ## Quick Start
//!
//! ```rust
//! use keyval::{from_str, to_string, Record};
//!
//! let records = from_str("# c\n[a.b]\nkey1 = v1\nkey2 = v2\n").unwrap();
//! assert_eq!(
//!     records,
//!     vec![
//!         Record::new(["a", "b", "key1"], "v1").with_comment("c"),
//!         Record::new(["a", "b", "key2"], "v2").with_comment("c"),
//!     ]
//! );
//!
//! let text = to_string(&records).unwrap();
//! assert_eq!(text, "# c\n[a.b]\nkey1 = v1\nkey2 = v2\n");
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use keyval::{Decoded, Reader};
//!
//! let mut reader = Reader::new("[section".as_bytes());
//! loop {
//!     match reader.read_record().unwrap() {
//!         Decoded::Record(record) => println!("{record}"),
//!         Decoded::NeedsMoreInput | Decoded::NoProgress => continue,
//!         Decoded::CleanEnd => break,
//!         Decoded::IncompleteEnd => {
//!             eprintln!("input was truncated");
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - No panics in the public API
//! - Decoders and encoders hold only instance-local state; they are not
//!   synchronized, and each instance belongs to one thread at a time
//!
//! ## Format
//!
//! See the [`format`] module.

#[macro_use]
mod macros;

pub mod de;
pub mod error;
pub mod escape;
pub mod format;
pub mod options;
pub mod record;
pub mod ser;
pub mod state;
pub mod syntax;

pub use de::{Decoded, Decoder, End, Reader, Records};
pub use error::{Error, Result};
pub use options::{ReaderOptions, WriterOptions, DEFAULT_READ_BUFFER_SIZE};
pub use record::Record;
pub use ser::{Encoder, Writer};
pub use syntax::{Class, Separator, Syntax};

use std::io;

/// Decodes a complete document held in memory.
///
/// # Examples
///
/// ```rust
/// use keyval::{from_slice, Record};
///
/// let records = from_slice(b"a key = a value").unwrap();
/// assert_eq!(records, vec![Record::new(["a key"], "a value")]);
/// ```
///
/// # Errors
///
/// Returns [`Error::Incomplete`] if the document ends inside a section
/// declaration or after an escape marker, and [`Error::InvalidUtf8`] if a
/// field is not valid UTF-8.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(input: &[u8]) -> Result<Vec<Record>> {
    from_slice_with_syntax(input, Syntax::default())
}

/// Decodes a complete document held in memory with custom structural
/// characters.
///
/// # Examples
///
/// ```rust
/// use keyval::{from_slice_with_syntax, Record, Separator, Syntax};
///
/// let syntax = Syntax::new().with_separator(Separator::Slash);
/// let records = from_slice_with_syntax(b"a/b.c = v", syntax).unwrap();
/// assert_eq!(records, vec![Record::new(["a", "b.c"], "v")]);
/// ```
///
/// # Errors
///
/// As [`from_slice`], plus [`Error::InvalidSyntax`] for an unusable syntax.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with_syntax(input: &[u8], syntax: Syntax) -> Result<Vec<Record>> {
    syntax.validate()?;
    let mut decoder = Decoder::with_syntax(syntax);
    decoder.feed(input);
    let end = decoder.finish();

    let records = std::iter::from_fn(|| decoder.next_record()).collect::<Result<Vec<_>>>()?;
    match end {
        End::Clean => Ok(records),
        End::Incomplete => Err(Error::Incomplete),
    }
}

/// Decodes a complete document from a string.
///
/// # Examples
///
/// ```rust
/// use keyval::{from_str, Record};
///
/// let records = from_str("[s]\nk1=v1\n[]\nk2=v2\n").unwrap();
/// assert_eq!(records[1], Record::new(["k2"], "v2"));
/// ```
///
/// # Errors
///
/// See [`from_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(input: &str) -> Result<Vec<Record>> {
    from_slice(input.as_bytes())
}

/// Reads every record from a source until it ends.
///
/// # Examples
///
/// ```rust
/// use keyval::{from_reader, Record};
/// use std::io::Cursor;
///
/// let records = from_reader(Cursor::new(b"# c\nkey = v\n")).unwrap();
/// assert_eq!(records, vec![Record::new(["key"], "v").with_comment("c")]);
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, [`Error::Incomplete`] if the
/// stream is truncated and [`Error::NoProgress`] if the source has no data
/// without having ended.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(reader: R) -> Result<Vec<Record>> {
    from_reader_with_options(reader, ReaderOptions::default())
}

/// Reads every record from a source with custom options.
///
/// # Errors
///
/// See [`from_reader`]; also [`Error::InvalidSyntax`] for an unusable syntax.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R: io::Read>(
    reader: R,
    options: ReaderOptions,
) -> Result<Vec<Record>> {
    options.syntax.validate()?;
    Reader::with_options(reader, options).records().collect()
}

/// Encodes records into a string.
///
/// # Examples
///
/// ```rust
/// use keyval::{to_string, Record};
///
/// let text = to_string(&[Record::new([" \t a key \t "], "v")]).unwrap();
/// assert_eq!(text, "\\ \t a key \t\\  = v\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidRecord`] for a record the format cannot express.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(records: &[Record]) -> Result<String> {
    to_string_with_options(records, WriterOptions::default())
}

/// Encodes records into a string with custom options.
///
/// # Errors
///
/// See [`to_string`]; also [`Error::InvalidSyntax`] for an unusable syntax.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(records: &[Record], options: WriterOptions) -> Result<String> {
    let bytes = to_vec_with_options(records, options)?;
    // Records are UTF-8 and structural characters are ASCII.
    String::from_utf8(bytes).map_err(Error::from)
}

/// Encodes records into bytes.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec(records: &[Record]) -> Result<Vec<u8>> {
    to_vec_with_options(records, WriterOptions::default())
}

fn to_vec_with_options(records: &[Record], options: WriterOptions) -> Result<Vec<u8>> {
    options.syntax.validate()?;
    let mut encoder = Encoder::with_options(options);
    let mut out = Vec::with_capacity(records.len() * 32);
    for record in records {
        encoder.encode(record, &mut out)?;
    }

    Ok(out)
}

/// Encodes records to a writer and flushes it.
///
/// # Examples
///
/// ```rust
/// use keyval::{to_writer, Record};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &[Record::new(["k"], "v")]).unwrap();
/// assert_eq!(buffer, b"k = v\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::ShortWrite`] if writing fails and
/// [`Error::InvalidRecord`] for a record the format cannot express.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write>(writer: W, records: &[Record]) -> Result<()> {
    to_writer_with_options(writer, records, WriterOptions::default())
}

/// Encodes records to a writer with custom options and flushes it.
///
/// # Errors
///
/// See [`to_writer`]; also [`Error::InvalidSyntax`] for an unusable syntax.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W: io::Write>(
    writer: W,
    records: &[Record],
    options: WriterOptions,
) -> Result<()> {
    options.syntax.validate()?;
    let mut writer = Writer::with_options(writer, options);
    for record in records {
        writer.write_record(record)?;
    }

    writer.flush()
}
