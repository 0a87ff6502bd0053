//! Basic keyval encoding and decoding.
//!
//! Run with: cargo run --example simple

use keyval::{from_str, record, to_string, Record};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let records = vec![
        record!(["server", "host"] => "localhost", comment: "connection"),
        record!(["server", "port"] => "8080", comment: "connection"),
        record!(["motd"] => "  welcome\nsecond line  "),
        Record::new(["paths", "data.dir"], "/var/lib/app"),
    ];

    // Encode to keyval
    let text = to_string(&records)?;
    println!("keyval output:\n{}", text);

    // Decode back into records
    let records_back = from_str(&text)?;
    assert_eq!(records, records_back);
    println!("✓ Round-trip successful");

    for record in &records_back {
        println!("{} = {:?}", record.joined_key('.'), record.value);
    }

    Ok(())
}
