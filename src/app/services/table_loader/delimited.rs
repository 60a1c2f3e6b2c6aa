//! Delimited-text parsing

use crate::Result;
use crate::app::models::{Cell, SourceTable};
use csv::ReaderBuilder;

/// Parse decoded text into a table, skipping `skip_rows` records before the
/// header row. Rows may be ragged; quoting follows RFC 4180.
pub fn parse_delimited(text: &str, delimiter: char, skip_rows: usize) -> Result<SourceTable> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        crate::Error::configuration(format!("delimiter '{}' is not a single byte", delimiter))
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(SourceTable::from_records(records, skip_rows))
}
