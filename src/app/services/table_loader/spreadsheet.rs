//! Spreadsheet-binary parsing (xls, xlsx) via calamine

use crate::app::models::{Cell, SourceTable};
use crate::{Error, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use rust_decimal::Decimal;
use std::io::Cursor;

/// Parse the first worksheet of a workbook into a table
pub fn parse_spreadsheet(file_name: &str, bytes: &[u8], skip_rows: usize) -> Result<SourceTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::load(file_name, format!("not a readable workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::load(file_name, "workbook has no worksheets"))?
        .map_err(|e| Error::load(file_name, format!("failed to read first worksheet: {}", e)))?;

    let records = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(SourceTable::from_records(records, skip_rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(value) => Cell::Number(Decimal::from(*value)),
        Data::Float(value) => match Decimal::try_from(*value) {
            Ok(decimal) => Cell::Number(decimal),
            Err(_) => Cell::from_text(&value.to_string()),
        },
        Data::String(value) => Cell::from_text(value),
        other => Cell::from_text(&other.to_string()),
    }
}
