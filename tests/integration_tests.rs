use keyval::{
    from_reader, from_str, record, to_string, to_string_with_options, to_writer_with_options,
    Decoded, Error, Reader, ReaderOptions, Record, Syntax, Writer, WriterOptions,
};
use std::io::{self, Read, Write};

/// Hands out at most `chunk` bytes per read.
struct ChunkedReader<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for ChunkedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Hands out its data, then reports that nothing is available without ever
/// ending.
struct EndlessReader<'a> {
    data: &'a [u8],
}

impl Read for EndlessReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Alternates between having nothing and handing out one byte.
struct StutteringReader<'a> {
    data: &'a [u8],
    ready: bool,
}

impl Read for StutteringReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ready = !self.ready;
        if !self.ready {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        match self.data.split_first() {
            Some((&c, rest)) => {
                buf[0] = c;
                self.data = rest;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

fn sample_records() -> Vec<Record> {
    vec![
        Record::new(["server", "tls", "cert"], "/etc/ssl/cert.pem").with_comment("tls settings"),
        Record::new(["server", "tls", "key"], " padded ").with_comment("tls settings"),
        Record::new(["weird.section", "x=y"], "a # b [c]"),
        Record::new(["multi"], "line one\nline two"),
        Record::new(["tab\tinside"], "\tlead"),
        Record::value_only("orphan"),
        Record::new(["s", "k"], "").with_comment("line1\nline2"),
        Record::new(["k"], "v").with_comment("# starts with a marker"),
        Record::new(["ключ"], "значение ✓"),
    ]
}

fn read_all<R: Read>(reader: &mut Reader<R>) -> (Vec<Record>, Decoded) {
    let mut records = Vec::new();
    loop {
        match reader.read_record().unwrap() {
            Decoded::Record(record) => records.push(record),
            Decoded::NeedsMoreInput => continue,
            status => return (records, status),
        }
    }
}

#[test]
fn test_comment_inheritance() {
    let records = from_str("# c\nkey1 = v1\nkey2 = v2\n").unwrap();
    assert_eq!(
        records,
        vec![
            Record::new(["key1"], "v1").with_comment("c"),
            Record::new(["key2"], "v2").with_comment("c"),
        ]
    );
}

#[test]
fn test_section_prefixing() {
    let records = from_str("[a.b]\nkey = v\n").unwrap();
    assert_eq!(records, vec![Record::new(["a", "b", "key"], "v")]);
}

#[test]
fn test_incomplete_section() {
    let mut reader = Reader::new("[section".as_bytes());
    let (records, status) = read_all(&mut reader);
    assert!(records.is_empty());
    assert_eq!(status, Decoded::IncompleteEnd);
    assert_eq!(reader.read_record().unwrap(), Decoded::IncompleteEnd);

    assert!(matches!(from_str("[section"), Err(Error::Incomplete)));
}

#[test]
fn test_empty_section_discard() {
    let records = from_str("[s]\nk1=v1\n[]\nk2=v2\n").unwrap();
    assert_eq!(records[0], Record::new(["s", "k1"], "v1"));
    assert_eq!(records[1].key, vec!["k2".to_string()]);
}

#[test]
fn test_escaped_boundary_whitespace() {
    let record = Record::new([" \t a key \t "], "");
    let text = to_string(&[record.clone()]).unwrap();
    assert_eq!(from_str(&text).unwrap(), vec![record]);
}

#[test]
fn test_decoded_empty_segments_write_back() {
    for doc in [
        "a. = v\n",
        "a.\n",
        ". = v\n",
        ".k = v\n",
        "[s]\na. = v\n",
        "[s]\n.. = v\n",
        "[a.]\nk = v\n",
        "[.]\n= v\n",
    ] {
        let records = from_str(doc).unwrap();
        let text = to_string(&records).unwrap();
        assert_eq!(from_str(&text).unwrap(), records, "{doc:?} written as {text:?}");
    }

    let records = from_str("a. = v\n").unwrap();
    assert_eq!(records, vec![Record::new(["a", ""], "v")]);
    assert_eq!(to_string(&records).unwrap(), "a. = v\n");

    let records = from_str(". = v\n").unwrap();
    assert_eq!(records, vec![Record::new(["", ""], "v")]);
    assert_eq!(to_string(&records).unwrap(), ". = v\n");
}

#[test]
fn test_comment_after_comment_only_record_is_not_discarded() {
    let records = [Record::comment_only("x"), Record::new(["k"], "v")];
    let text = to_string(&records).unwrap();
    assert_eq!(text, "# x\n\n##\nk = v\n");
    assert_eq!(
        from_str(&text).unwrap(),
        vec![Record::new(["k"], "v").with_comment("x")]
    );
}

#[test]
fn test_round_trip() {
    let records = sample_records();
    let text = to_string(&records).unwrap();
    println!("{text}");
    assert_eq!(from_str(&text).unwrap(), records);
}

#[test]
fn test_round_trip_one_byte_at_a_time() {
    let records = sample_records();
    let text = to_string(&records).unwrap();
    let reader = ChunkedReader {
        data: text.as_bytes(),
        chunk: 1,
    };
    assert_eq!(from_reader(reader).unwrap(), records);
}

#[test]
fn test_round_trip_through_buffered_writer() {
    let records = sample_records();
    let mut out = Vec::new();
    to_writer_with_options(&mut out, &records, WriterOptions::new().with_buffer_size(7)).unwrap();
    assert_eq!(out, to_string(&records).unwrap().into_bytes());
}

#[test]
fn test_chunk_sizes_do_not_matter() {
    let doc = "# a comment\n[a.b]\nkey one = value one \\\n continued\n[]\n\\ k = \\ v\\ \n= last";
    let expected = from_str(doc).unwrap();
    for chunk in 1..=doc.len() {
        let reader = ChunkedReader {
            data: doc.as_bytes(),
            chunk,
        };
        assert_eq!(from_reader(reader).unwrap(), expected, "chunk size {chunk}");
    }
}

#[test]
fn test_reader_buffer_sizes_do_not_matter() {
    let doc = "# c\n[s]\nk1 = v1\nk2 = v2\n[t] k3 = v3";
    let expected = from_str(doc).unwrap();
    for size in [1, 2, 3, 5, 8, 64] {
        let options = ReaderOptions::new().with_buffer_size(size);
        let mut reader = Reader::with_options(doc.as_bytes(), options);
        let (records, status) = read_all(&mut reader);
        assert_eq!(records, expected, "buffer size {size}");
        assert_eq!(status, Decoded::CleanEnd);
    }
}

#[test]
fn test_endless_source_reports_no_progress() {
    let mut reader = Reader::new(EndlessReader {
        data: b"a key = a value\n# pending",
    });
    assert_eq!(
        reader.read_record().unwrap(),
        Decoded::Record(Record::new(["a key"], "a value"))
    );
    assert_eq!(reader.read_record().unwrap(), Decoded::NoProgress);
    assert_eq!(reader.read_record().unwrap(), Decoded::NoProgress);
}

#[test]
fn test_endless_source_holds_back_unterminated_entry() {
    for doc in ["# a comment", "[section]", "a key", "= a value"] {
        let mut reader = Reader::new(EndlessReader {
            data: doc.as_bytes(),
        });
        let (records, status) = read_all(&mut reader);
        assert!(records.is_empty(), "{doc:?}");
        assert_eq!(status, Decoded::NoProgress, "{doc:?}");
    }
}

#[test]
fn test_no_progress_can_be_retried() {
    let doc = "# c\nkey = v\n[s";
    let mut reader = Reader::new(StutteringReader {
        data: doc.as_bytes(),
        ready: false,
    });

    let mut records = Vec::new();
    let mut stalls = 0;
    let status = loop {
        match reader.read_record().unwrap() {
            Decoded::Record(record) => records.push(record),
            Decoded::NeedsMoreInput => {}
            Decoded::NoProgress => stalls += 1,
            status => break status,
        }
    };

    assert_eq!(records, vec![Record::new(["key"], "v").with_comment("c")]);
    assert_eq!(status, Decoded::IncompleteEnd);
    assert!(stalls >= doc.len());
}

#[test]
fn test_records_iterator_yields_no_progress_and_continues() {
    let mut reader = Reader::new(StutteringReader {
        data: b"k = v\n",
        ready: false,
    });

    let mut records = Vec::new();
    for item in reader.records() {
        match item {
            Ok(record) => records.push(record),
            Err(Error::NoProgress) => continue,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(records, vec![Record::new(["k"], "v")]);
}

#[test]
fn test_from_reader_fails_on_endless_source() {
    let result = from_reader(EndlessReader { data: b"k = v\n" });
    assert!(matches!(result, Err(Error::NoProgress)));
}

#[test]
fn test_alternate_markers() {
    let syntax = Syntax::new().with_alt_comment(b';').with_alt_value(b':');
    let options = ReaderOptions::new().with_syntax(syntax.clone());
    let records = keyval::from_reader_with_options("; c\nk: v\nj = w\n".as_bytes(), options)
        .unwrap();
    assert_eq!(
        records,
        vec![
            Record::new(["k"], "v").with_comment("c"),
            Record::new(["j"], "w").with_comment("c"),
        ]
    );

    // Without the alternates they are plain content.
    let plain = from_str("; c\nk: v\n").unwrap();
    assert_eq!(plain, vec![Record::new(["; c"], ""), Record::new(["k: v"], "")]);
}

#[test]
fn test_alternate_markers_are_escaped_when_enabled() {
    let syntax = Syntax::new().with_alt_comment(b';').with_alt_value(b':');
    let options = WriterOptions::new().with_syntax(syntax).with_alt_comment(true);
    let text = to_string_with_options(
        &[Record::new(["a:b"], "x;y").with_comment("; note")],
        options,
    )
    .unwrap();
    assert_eq!(text, "; \\; note\na\\:b = x\\;y\n");
}

#[test]
fn test_writer_separator_reads_as_nothing() {
    let mut writer = Writer::new(Vec::new());
    writer.write_record(&record!(["a"] => "1")).unwrap();
    writer.write_separator().unwrap();
    writer.write_record(&record!(["b"] => "2")).unwrap();
    let out = writer.into_inner().unwrap();
    assert_eq!(out, b"a = 1\n\nb = 2\n");
    assert_eq!(
        from_str(std::str::from_utf8(&out).unwrap()).unwrap(),
        vec![record!(["a"] => "1"), record!(["b"] => "2")]
    );
}

#[test]
fn test_writer_rejects_record_and_stays_usable() {
    let mut writer = Writer::new(Vec::new());
    let err = writer.write_record(&Record::new([""], "v")).unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(_)));
    writer.write_record(&Record::new(["k"], "v")).unwrap();
    assert_eq!(writer.into_inner().unwrap(), b"k = v\n");
}

#[test]
fn test_writer_error_is_sticky() {
    struct BrokenPipe {
        writes: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let mut writer = Writer::new(BrokenPipe { writes: 0 });
    let first = writer.write_record(&Record::new(["k"], "v")).unwrap_err();
    assert_eq!(first.io_kind(), Some(io::ErrorKind::BrokenPipe));
    let second = writer.write_separator().unwrap_err();
    let third = writer.flush().unwrap_err();
    assert!(first.is_same(&second));
    assert!(first.is_same(&third));
    assert_eq!(writer.get_ref().writes, 1);
}

#[test]
fn test_reader_error_is_sticky() {
    struct Reset {
        reads: usize,
    }

    impl Read for Reset {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            Err(io::ErrorKind::ConnectionReset.into())
        }
    }

    let mut reader = Reader::new(Reset { reads: 0 });
    let first = reader.read_record().unwrap_err();
    let second = reader.read_record().unwrap_err();
    assert_eq!(first.io_kind(), Some(io::ErrorKind::ConnectionReset));
    assert!(first.is_same(&second));
    assert_eq!(reader.get_ref().reads, 1);
}

#[test]
fn test_record_serde() {
    let records = from_str("# c\n[a]\nb = v\n").unwrap();
    let json = serde_json::to_string(&records).unwrap();
    assert_eq!(json, r#"[{"key":["a","b"],"value":"v","comment":"c"}]"#);
    let back: Vec<Record> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, records);
}
