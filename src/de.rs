//! Decoding keyval streams into records.
//!
//! Two integration styles are offered:
//!
//! - [`Decoder`] is push-based: hand it chunks of any size with
//!   [`Decoder::feed`], take finished records with [`Decoder::next_record`]
//!   and close the stream with [`Decoder::finish`].
//! - [`Reader`] is pull-based: it wraps any [`io::Read`] and returns one
//!   [`Decoded`] outcome per call to [`Reader::read_record`].
//!
//! Chunk boundaries never matter. A chunk may end in the middle of a token or
//! right after an escape marker; the next chunk continues where it left off.
//!
//! ## Usage
//!
//! ```rust
//! use keyval::{Decoded, Reader, Record};
//!
//! let mut reader = Reader::new("# c\nkey1 = v1\nkey2 = v2\n".as_bytes());
//! let mut records = Vec::new();
//! loop {
//!     match reader.read_record().unwrap() {
//!         Decoded::Record(record) => records.push(record),
//!         Decoded::NeedsMoreInput => continue,
//!         Decoded::CleanEnd => break,
//!         other => panic!("unexpected {other:?}"),
//!     }
//! }
//!
//! assert_eq!(records[0], Record::new(["key1"], "v1").with_comment("c"));
//! assert_eq!(records[1], Record::new(["key2"], "v2").with_comment("c"));
//! ```
//!
//! ## Sources without data
//!
//! A source returning `Ok(0)` has ended. A source that has nothing right now
//! but is not finished signals it with [`io::ErrorKind::WouldBlock`] (or
//! [`io::ErrorKind::Interrupted`]); the reader reports that as
//! [`Decoded::NoProgress`] and the call may simply be repeated later.

use crate::options::ReaderOptions;
use crate::state::{transition, Accumulator, State};
use crate::{Error, Record, Result, Syntax};
use std::io;
use tracing::{debug, trace};

/// How a stream ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum End {
    /// Nothing was left open.
    Clean,
    /// The stream ended inside a section declaration or right after an escape
    /// marker, which usually means it was truncated.
    Incomplete,
}

/// The outcome of one [`Reader::read_record`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    Record(Record),
    /// Bytes were consumed but no record is finished yet.
    NeedsMoreInput,
    /// The source had no data without having ended. Retrying is allowed.
    NoProgress,
    CleanEnd,
    IncompleteEnd,
}

impl From<End> for Decoded {
    fn from(end: End) -> Self {
        match end {
            End::Clean => Decoded::CleanEnd,
            End::Incomplete => Decoded::IncompleteEnd,
        }
    }
}

/// Push-based decoder.
///
/// # Examples
///
/// ```rust
/// use keyval::{Decoder, End, Record};
///
/// let mut decoder = Decoder::new();
/// decoder.feed(b"[a.b]\nke");
/// assert!(decoder.next_record().is_none());
/// decoder.feed(b"y = v\n");
///
/// let record = decoder.next_record().unwrap().unwrap();
/// assert_eq!(record, Record::new(["a", "b", "key"], "v"));
/// assert_eq!(decoder.finish(), End::Clean);
/// ```
#[derive(Debug)]
pub struct Decoder {
    syntax: Syntax,
    state: State,
    acc: Accumulator,
    escape_next: bool,
    end: Option<End>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::with_syntax(Syntax::default())
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_syntax(syntax: Syntax) -> Self {
        Decoder {
            syntax,
            state: State::Idle,
            acc: Accumulator::new(),
            escape_next: false,
            end: None,
        }
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Consumes a chunk of input. Finished records are queued.
    ///
    /// Input fed after [`finish`](Self::finish) is ignored.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.end.is_some() {
            return;
        }

        for &c in chunk {
            if self.escape_next {
                self.escape_next = false;
                self.state = transition(self.state, self.syntax.classify(c), c, true, &mut self.acc);
            } else if c == self.syntax.escape {
                self.escape_next = true;
            } else {
                self.state = transition(self.state, self.syntax.classify(c), c, false, &mut self.acc);
            }
        }
    }

    /// Takes the oldest finished record, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`] for a record whose fields are not UTF-8.
    pub fn next_record(&mut self) -> Option<Result<Record>> {
        self.acc.pop_record()
    }

    /// Number of finished records waiting in the queue.
    pub fn pending(&self) -> usize {
        self.acc.ready_len()
    }

    /// Marks the end of the input.
    ///
    /// Content collected but not yet emitted, like a comment closed only by
    /// the end of the stream, is queued as a last record. Calling this again
    /// returns the same result without further effect.
    pub fn finish(&mut self) -> End {
        if let Some(end) = self.end {
            return end;
        }

        let end = if self.state.in_section() || self.escape_next {
            End::Incomplete
        } else {
            End::Clean
        };

        self.acc.finish(self.state);
        self.state = State::Idle;
        self.end = Some(end);
        end
    }
}

#[derive(Debug)]
enum Terminal {
    End(End),
    Failed(Error),
}

/// Pull-based decoder over an [`io::Read`] source.
///
/// Each call to [`read_record`](Self::read_record) performs at most one read
/// from the source. Records already queued are returned before the source is
/// touched again. Once the stream has ended or a hard error occurred, every
/// further call returns the same status or error without reading.
pub struct Reader<R> {
    inner: R,
    decoder: Decoder,
    buffer: Vec<u8>,
    buffer_size: usize,
    eof: bool,
    terminal: Option<Terminal>,
}

impl<R: io::Read> Reader<R> {
    /// Creates a reader with default options.
    pub fn new(inner: R) -> Self {
        Self::with_options(inner, ReaderOptions::default())
    }

    pub fn with_options(inner: R, options: ReaderOptions) -> Self {
        Reader {
            inner,
            decoder: Decoder::with_syntax(options.syntax),
            buffer: Vec::new(),
            buffer_size: options.buffer_size,
            eof: false,
            terminal: None,
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Changes the size of subsequent reads. The scratch buffer is
    /// reallocated on the next read.
    pub fn set_buffer_size(&mut self, size: usize) {
        self.buffer_size = size;
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the next record, or reports why there is none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the source fails and [`Error::InvalidUtf8`]
    /// when a record is not valid UTF-8. Both are cached and returned again
    /// by every later call.
    pub fn read_record(&mut self) -> Result<Decoded> {
        match &self.terminal {
            Some(Terminal::Failed(err)) => return Err(err.clone()),
            Some(Terminal::End(end)) => return Ok((*end).into()),
            None => {}
        }

        if let Some(record) = self.take_ready()? {
            return Ok(Decoded::Record(record));
        }

        if self.eof {
            return self.end_of_stream();
        }

        let size = self.buffer_size.max(1);
        if self.buffer.len() != size {
            self.buffer = vec![0; size];
        }

        let n = match self.inner.read(&mut self.buffer) {
            Ok(0) => {
                self.eof = true;
                return self.end_of_stream();
            }
            Ok(n) => n,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                trace!(kind = ?err.kind(), "source made no progress");
                return Ok(Decoded::NoProgress);
            }
            Err(err) => return Err(self.fail(Error::io(err))),
        };

        trace!(bytes = n, "read chunk");
        self.decoder.feed(&self.buffer[..n]);

        match self.take_ready()? {
            Some(record) => Ok(Decoded::Record(record)),
            None => Ok(Decoded::NeedsMoreInput),
        }
    }

    /// Iterates over the remaining records.
    ///
    /// The iterator waits through [`Decoded::NeedsMoreInput`], stops at a
    /// clean end, and yields [`Error::Incomplete`] for a truncated stream and
    /// [`Error::NoProgress`] for a source without data. Only the latter may
    /// be followed by more items.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            done: false,
        }
    }

    fn take_ready(&mut self) -> Result<Option<Record>> {
        match self.decoder.next_record() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(err)) => Err(self.fail(err)),
            None => Ok(None),
        }
    }

    fn end_of_stream(&mut self) -> Result<Decoded> {
        let end = self.decoder.finish();
        if let Some(record) = self.take_ready()? {
            return Ok(Decoded::Record(record));
        }

        debug!(?end, "stream ended");
        self.terminal = Some(Terminal::End(end));
        Ok(end.into())
    }

    fn fail(&mut self, err: Error) -> Error {
        debug!(error = %err, "decoding failed");
        self.terminal = Some(Terminal::Failed(err.clone()));
        err
    }
}

/// Iterator returned by [`Reader::records`].
pub struct Records<'a, R> {
    reader: &'a mut Reader<R>,
    done: bool,
}

impl<R: io::Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let item = match self.reader.read_record() {
                Ok(Decoded::Record(record)) => Ok(record),
                Ok(Decoded::NeedsMoreInput) => continue,
                Ok(Decoded::NoProgress) => return Some(Err(Error::NoProgress)),
                Ok(Decoded::CleanEnd) => {
                    self.done = true;
                    return None;
                }
                Ok(Decoded::IncompleteEnd) => Err(Error::Incomplete),
                Err(err) => Err(err),
            };

            if item.is_err() {
                self.done = true;
            }

            return Some(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    struct FailingReader {
        reads: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            Err(io::Error::new(io::ErrorKind::Other, "expected failing read"))
        }
    }

    /// Records the size of every read and never has data.
    struct MeasureReader {
        last_read_size: usize,
    }

    impl Read for MeasureReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.last_read_size = buf.len();
            Err(io::ErrorKind::WouldBlock.into())
        }
    }

    fn measure(reader: &mut Reader<MeasureReader>) -> usize {
        assert_eq!(reader.read_record().unwrap(), Decoded::NoProgress);
        reader.get_ref().last_read_size
    }

    #[test]
    fn test_empty_source_ends_clean() {
        let mut reader = Reader::new(io::empty());
        assert_eq!(reader.read_record().unwrap(), Decoded::CleanEnd);
        assert_eq!(reader.read_record().unwrap(), Decoded::CleanEnd);
    }

    #[test]
    fn test_returns_same_error_on_repeated_call() {
        let mut reader = Reader::new(FailingReader { reads: 0 });
        let first = reader.read_record().unwrap_err();
        let second = reader.read_record().unwrap_err();
        assert!(first.is_same(&second));
        assert_eq!(reader.get_ref().reads, 1);
    }

    #[test]
    fn test_default_buffer_size() {
        let mut reader = Reader::new(MeasureReader { last_read_size: 0 });
        assert_eq!(measure(&mut reader), crate::options::DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_configured_buffer_size() {
        let options = ReaderOptions::new().with_buffer_size(42);
        let mut reader = Reader::with_options(MeasureReader { last_read_size: 0 }, options);
        assert_eq!(measure(&mut reader), 42);
    }

    #[test]
    fn test_minimal_buffer_size() {
        let options = ReaderOptions::new().with_buffer_size(0);
        let mut reader = Reader::with_options(MeasureReader { last_read_size: 0 }, options);
        assert_eq!(measure(&mut reader), 1);
    }

    #[test]
    fn test_update_buffer_size() {
        let options = ReaderOptions::new().with_buffer_size(36);
        let mut reader = Reader::with_options(MeasureReader { last_read_size: 0 }, options);
        assert_eq!(measure(&mut reader), 36);
        reader.set_buffer_size(42);
        assert_eq!(measure(&mut reader), 42);
    }

    #[test]
    fn test_queued_records_drain_before_next_read() {
        let options = ReaderOptions::new().with_buffer_size(1024);
        let mut reader = Reader::with_options(&b"a = 1\nb = 2\nc = 3\n"[..], options);
        for key in ["a", "b", "c"] {
            match reader.read_record().unwrap() {
                Decoded::Record(record) => assert_eq!(record.key, vec![key.to_string()]),
                other => panic!("expected record, got {other:?}"),
            }
        }
        assert_eq!(reader.get_ref().len(), 0);
        assert_eq!(reader.read_record().unwrap(), Decoded::CleanEnd);
    }

    #[test]
    fn test_final_record_precedes_terminal_status() {
        let mut reader = Reader::new(&b"# a comment"[..]);
        assert_eq!(reader.read_record().unwrap(), Decoded::NeedsMoreInput);
        assert_eq!(
            reader.read_record().unwrap(),
            Decoded::Record(Record::comment_only("a comment"))
        );
        assert_eq!(reader.read_record().unwrap(), Decoded::CleanEnd);
    }

    #[test]
    fn test_dangling_escape_is_incomplete() {
        let mut decoder = Decoder::new();
        decoder.feed(b"key\\");
        assert_eq!(decoder.finish(), End::Incomplete);
        assert_eq!(decoder.next_record().unwrap().unwrap(), Record::new(["key"], ""));
        assert_eq!(decoder.finish(), End::Incomplete);
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut decoder = Decoder::new();
        decoder.feed(b"a\\");
        decoder.feed(b"=b = c\\");
        decoder.feed(b"\n");
        assert_eq!(decoder.finish(), End::Clean);
        assert_eq!(
            decoder.next_record().unwrap().unwrap(),
            Record::new(["a=b"], "c\n")
        );
    }

    #[test]
    fn test_invalid_utf8_is_sticky() {
        let mut reader = Reader::new(&b"k = \xff\n"[..]);
        let first = reader.read_record().unwrap_err();
        assert!(matches!(first, Error::InvalidUtf8(_)));
        assert!(matches!(reader.read_record(), Err(Error::InvalidUtf8(_))));
    }

    #[test]
    fn test_records_iterator_reports_truncation() {
        let mut reader = Reader::new(&b"[one][two"[..]);
        let items: Vec<_> = reader.records().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &Record::new(["one"], ""));
        assert!(matches!(items[1], Err(Error::Incomplete)));
    }
}
