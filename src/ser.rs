//! Encoding records into keyval text.
//!
//! The [`Encoder`] is a stateful renderer. It remembers the comment and the
//! section it last wrote and only emits what changed between successive
//! records, so a sequence of records sharing a comment and a section prefix
//! comes out as one comment block, one section declaration and one line per
//! record. Every field is escaped so that the decoder reads back exactly the
//! same text.
//!
//! The [`Writer`] drives an encoder over any [`io::Write`] sink, with optional
//! chunked buffering.
//!
//! ## Usage
//!
//! ```rust
//! use keyval::{Record, Writer};
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.write_record(&Record::new(["server", "host"], "localhost").with_comment("db")).unwrap();
//! writer.write_record(&Record::new(["server", "port"], "5432").with_comment("db")).unwrap();
//! writer.write_record(&Record::new(["debug"], "true")).unwrap();
//!
//! let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(
//!     text,
//!     "# db\n[server]\nhost = localhost\nport = 5432\n\n##\n[]\ndebug = true\n"
//! );
//! ```

use crate::escape::{escape_into, Escapes};
use crate::options::WriterOptions;
use crate::{Error, Record, Result};
use std::io;
use tracing::{debug, trace};

/// Stateful renderer of records.
#[derive(Debug)]
pub struct Encoder {
    options: WriterOptions,
    escapes: Escapes,
    comment: String,
    section: Vec<String>,
    started: bool,
    /// A comment block was written and no entry line has followed it yet.
    comment_open: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::with_options(WriterOptions::default())
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Encoder {
            escapes: Escapes::new(&options.syntax),
            options,
            comment: String::new(),
            section: Vec::new(),
            started: false,
            comment_open: false,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Renders `record` into `out`.
    ///
    /// A record with no comment, key or value renders nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] for the key `[""]` together with a
    /// value: a lone empty key segment has no written form. Nothing is
    /// rendered in that case. Without a value that key renders as a bare line
    /// terminator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyval::{Encoder, Record};
    ///
    /// let mut encoder = Encoder::new();
    /// let mut out = Vec::new();
    /// encoder.encode(&Record::new(["a", "b", "key"], " v "), &mut out).unwrap();
    /// assert_eq!(out, b"[a.b]\nkey = \\ v\\ \n");
    /// ```
    pub fn encode(&mut self, record: &Record, out: &mut Vec<u8>) -> Result<()> {
        if record.is_empty() {
            return Ok(());
        }

        let (section, local) = match record.split_key() {
            Some(split) => split,
            None if record.value.is_empty() => (&[][..], record.key.as_slice()),
            None => {
                return Err(Error::invalid_record(
                    "a key of one empty segment cannot carry a value",
                ))
            }
        };

        let newline = self.options.syntax.newline;

        let mut comment_written = false;
        if record.comment != self.comment {
            if self.started {
                out.push(newline);
            }

            self.write_comment(&record.comment, out);
            self.comment.clone_from(&record.comment);
            self.started = true;
            self.comment_open = true;
            comment_written = true;
        }

        let has_value = !record.value.is_empty();
        let has_local = !local.is_empty();
        if section != self.section.as_slice() && (has_local || has_value) {
            if self.started && !comment_written && !self.comment_open {
                out.push(newline);
            }

            self.write_section(section, out);
            out.push(newline);
            self.section = section.to_vec();
            self.started = true;
        }

        for (i, segment) in local.iter().enumerate() {
            if i > 0 {
                out.push(self.options.syntax.separator);
            }

            escape_into(out, segment.as_bytes(), &self.escapes.key, self.options.syntax.escape);
        }

        if has_value {
            if has_local {
                out.push(self.options.syntax.space);
            }

            out.push(self.options.syntax.value);
            out.push(self.options.syntax.space);
            escape_into(
                out,
                record.value.as_bytes(),
                &self.escapes.value,
                self.options.syntax.escape,
            );
        }

        if has_local || has_value {
            out.push(newline);
            self.started = true;
            self.comment_open = false;
        }

        Ok(())
    }

    /// Renders a bare line terminator: a record separator with no content.
    pub fn encode_separator(&mut self, out: &mut Vec<u8>) {
        out.push(self.options.syntax.newline);
        self.started = true;
        self.comment_open = false;
    }

    fn write_comment(&self, comment: &str, out: &mut Vec<u8>) {
        let syntax = &self.options.syntax;
        let marker = self.options.comment_marker();

        // An empty block discards the comment of the records that follow.
        if comment.is_empty() {
            out.extend_from_slice(&[marker, marker, syntax.newline]);
            return;
        }

        for line in comment.as_bytes().split(|&c| c == syntax.newline) {
            out.push(marker);
            if !line.is_empty() {
                out.push(syntax.space);
                escape_into(out, line, &self.escapes.comment, syntax.escape);
            }

            out.push(syntax.newline);
        }
    }

    fn write_section(&self, section: &[String], out: &mut Vec<u8>) {
        let syntax = &self.options.syntax;
        out.push(syntax.open_section);
        for (i, segment) in section.iter().enumerate() {
            if i > 0 {
                out.push(syntax.separator);
            }

            escape_into(out, segment.as_bytes(), &self.escapes.section, syntax.escape);
        }

        out.push(syntax.close_section);
    }
}

/// Writes records to an [`io::Write`] sink.
///
/// Every write to the sink must accept the full byte count; a short write is
/// reported as [`Error::ShortWrite`]. The first transport or short-write
/// error is cached and returned by every later call without touching the
/// sink again.
///
/// With a positive buffer size, output is collected and handed to the sink
/// in chunks of exactly that size; [`flush`](Self::flush) writes the rest.
/// With buffer size zero, each record is written as soon as it is rendered.
pub struct Writer<W: io::Write> {
    inner: W,
    encoder: Encoder,
    buffer_size: usize,
    buffer: Vec<u8>,
    scratch: Vec<u8>,
    error: Option<Error>,
}

impl<W: io::Write> Writer<W> {
    /// Creates an unbuffered writer with default options.
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, WriterOptions::default())
    }

    pub fn with_options(inner: W, options: WriterOptions) -> Self {
        Writer {
            inner,
            buffer_size: options.buffer_size,
            encoder: Encoder::with_options(options),
            buffer: Vec::new(),
            scratch: Vec::with_capacity(256),
            error: None,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Writes one record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] for a record the format cannot
    /// express; the writer stays usable. Transport and short-write errors
    /// are sticky.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.check()?;
        self.scratch.clear();
        self.encoder.encode(record, &mut self.scratch)?;
        self.emit()
    }

    /// Writes a bare line terminator.
    pub fn write_separator(&mut self) -> Result<()> {
        self.check()?;
        self.scratch.clear();
        self.encoder.encode_separator(&mut self.scratch);
        self.emit()
    }

    /// Writes out everything buffered and flushes the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.check()?;
        if self.buffer_size > 0 {
            self.drain_chunks()?;
            let rest = std::mem::take(&mut self.buffer);
            self.write_checked(&rest)?;
        }

        if let Err(err) = self.inner.flush() {
            return Err(self.fail(Error::io(err)));
        }

        Ok(())
    }

    /// Flushes and returns the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn emit(&mut self) -> Result<()> {
        if self.buffer_size == 0 {
            let fragment = std::mem::take(&mut self.scratch);
            let result = self.write_checked(&fragment);
            self.scratch = fragment;
            return result;
        }

        self.buffer.extend_from_slice(&self.scratch);
        self.drain_chunks()
    }

    fn drain_chunks(&mut self) -> Result<()> {
        let size = self.buffer_size;
        let mut written = 0;
        while self.buffer.len() - written >= size {
            let chunk = self.buffer[written..written + size].to_vec();
            self.write_checked(&chunk)?;
            written += size;
        }

        self.buffer.drain(..written);
        Ok(())
    }

    fn write_checked(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        match self.inner.write(bytes) {
            Ok(n) if n == bytes.len() => {
                trace!(bytes = n, "wrote chunk");
                Ok(())
            }
            Ok(n) => Err(self.fail(Error::ShortWrite {
                expected: bytes.len(),
                written: n,
            })),
            Err(err) => Err(self.fail(Error::io(err))),
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        debug!(error = %err, "encoding failed");
        self.error = Some(err.clone());
        err
    }
}
