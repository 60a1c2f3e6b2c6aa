//! Tabular loader for settlement exports
//!
//! Turns the raw bytes of one uploaded file into a [`SourceTable`]:
//!
//! - [`loader`] - strategy orchestration (header offset, encodings, fallback)
//! - [`delimited`] - comma/tab separated text parsing
//! - [`spreadsheet`] - xls/xlsx parsing for exports that are not text
//!
//! [`SourceTable`]: crate::app::models::SourceTable

pub mod delimited;
pub mod loader;
pub mod spreadsheet;

#[cfg(test)]
pub mod tests;

pub use loader::{LoadedTable, SourceFormat, TableLoader};
