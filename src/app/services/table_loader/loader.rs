//! Loader strategy orchestration
//!
//! Policy, in order:
//! 1. Header-offset exports (by filename) skip their metadata rows first
//! 2. `decode_text` picks the first candidate encoding × delimiter whose parse
//!    is at least `min_columns` wide; narrower parses mean wrong encoding or
//!    wrong delimiter
//! 3. Spreadsheet-binary parsing as the fallback (tried first when the bytes
//!    carry a zip/OLE signature)
//! 4. Exhausting every strategy is a load error ("undecodable")

use super::delimited::parse_delimited;
use super::spreadsheet::parse_spreadsheet;
use crate::app::models::SourceTable;
use crate::app::services::normalizer::{TextEncoding, decode_text};
use crate::config::LoaderConfig;
use crate::constants::{OLE_MAGIC, ZIP_MAGIC};
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Which strategy produced the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFormat {
    Delimited {
        encoding: TextEncoding,
        delimiter: char,
    },
    Spreadsheet,
    /// Line items from the remote settlement API
    Remote,
}

/// A loaded table with the strategy that produced it
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: SourceTable,
    pub format: SourceFormat,
    pub skipped_header_rows: usize,
}

/// Loads settlement exports according to a [`LoaderConfig`]
#[derive(Debug, Clone, Copy)]
pub struct TableLoader<'a> {
    config: &'a LoaderConfig,
}

impl<'a> TableLoader<'a> {
    pub fn new(config: &'a LoaderConfig) -> Self {
        Self { config }
    }

    /// Load one file's bytes into a table
    pub fn load(&self, file_name: &str, bytes: &[u8]) -> Result<LoadedTable> {
        let skip_rows = self.config.skip_rows_for(file_name);
        if skip_rows > 0 {
            debug!("{}: header-offset export, skipping {} rows", file_name, skip_rows);
        }

        if looks_like_workbook(bytes) {
            debug!("{}: workbook signature, trying spreadsheet first", file_name);
            if let Some(loaded) = self.try_spreadsheet(file_name, bytes, skip_rows) {
                return Ok(loaded);
            }
        } else {
            match self.try_delimited(file_name, bytes, skip_rows) {
                Ok(loaded) => return Ok(loaded),
                Err(e) => debug!("{}; trying spreadsheet", e),
            }
            if let Some(loaded) = self.try_spreadsheet(file_name, bytes, skip_rows) {
                return Ok(loaded);
            }
        }

        Err(Error::load(file_name, "undecodable"))
    }

    fn try_delimited(&self, file_name: &str, bytes: &[u8], skip_rows: usize) -> Result<LoadedTable> {
        let decoded = decode_text(
            file_name,
            bytes,
            &self.config.encodings,
            &self.config.delimiters,
            self.config.min_columns,
        )?;

        let table = parse_delimited(&decoded.text, decoded.delimiter, skip_rows)?;
        if !self.is_wide_enough(&table) {
            return Err(Error::decoding(
                file_name,
                format!(
                    "{} with {:?} gives {} column(s) below the header offset",
                    decoded.encoding.label(),
                    decoded.delimiter,
                    table.column_count()
                ),
            ));
        }

        info!(
            "{}: loaded {} rows x {} columns ({}, {:?})",
            file_name,
            table.row_count(),
            table.column_count(),
            decoded.encoding.label(),
            decoded.delimiter
        );
        Ok(LoadedTable {
            table,
            format: SourceFormat::Delimited {
                encoding: decoded.encoding,
                delimiter: decoded.delimiter,
            },
            skipped_header_rows: skip_rows,
        })
    }

    fn try_spreadsheet(&self, file_name: &str, bytes: &[u8], skip_rows: usize) -> Option<LoadedTable> {
        match parse_spreadsheet(file_name, bytes, skip_rows) {
            Ok(table) if self.is_wide_enough(&table) => {
                info!(
                    "{}: loaded {} rows x {} columns (spreadsheet)",
                    file_name,
                    table.row_count(),
                    table.column_count()
                );
                Some(LoadedTable {
                    table,
                    format: SourceFormat::Spreadsheet,
                    skipped_header_rows: skip_rows,
                })
            }
            Ok(table) => {
                debug!(
                    "{}: spreadsheet gives {} column(s), rejected",
                    file_name,
                    table.column_count()
                );
                None
            }
            Err(e) => {
                debug!("{}: spreadsheet parse failed: {}", file_name, e);
                None
            }
        }
    }

    fn is_wide_enough(&self, table: &SourceTable) -> bool {
        table.column_count() >= self.config.min_columns
    }
}

fn looks_like_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}
