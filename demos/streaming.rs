//! Reading records one at a time and reacting to truncated input.
//!
//! Run with: cargo run --example streaming

use keyval::{Decoded, Reader, ReaderOptions, Writer, WriterOptions};
use std::error::Error;

const DOCUMENT: &str = "\
# upstream servers
[upstream.primary]
host = 10.0.0.1
port = 443

[upstream.backup]
host = 10.0.0.2
port = 443

[limits";

fn main() -> Result<(), Box<dyn Error>> {
    // Tiny reads show that chunk boundaries do not matter.
    let options = ReaderOptions::new().with_buffer_size(7);
    let mut reader = Reader::with_options(DOCUMENT.as_bytes(), options);

    let mut writer = Writer::with_options(
        std::io::stdout(),
        WriterOptions::new().with_buffer_size(64),
    );

    loop {
        match reader.read_record()? {
            Decoded::Record(record) => writer.write_record(&record)?,
            Decoded::NeedsMoreInput | Decoded::NoProgress => continue,
            Decoded::CleanEnd => break,
            Decoded::IncompleteEnd => {
                writer.flush()?;
                eprintln!("\n✗ input ended inside a section declaration");
                return Ok(());
            }
        }
    }

    writer.flush()?;
    Ok(())
}
