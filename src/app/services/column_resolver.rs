//! Keyword-based column resolution
//!
//! Marketplaces rename, re-space and reorder headers between export versions.
//! Every adapter looks columns up through [`find_column`], never by exact name.

use crate::app::models::{ColumnRef, SourceTable};
use crate::{Error, Result};
use unicode_normalization::UnicodeNormalization;

/// Compose to NFC, lowercase and drop all whitespace
///
/// macOS hands back decomposed Hangul (NFD) in file names, so composition
/// comes first or no Korean token would ever match.
pub fn normalize_header(value: &str) -> String {
    value
        .nfc()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First column, in column order, whose normalized name contains the
/// normalized keyword. `None` when absent; callers treat that as zero.
pub fn find_column(table: &SourceTable, keyword: &str) -> Option<ColumnRef> {
    let keyword = normalize_header(keyword);
    if keyword.is_empty() {
        return None;
    }

    table
        .headers()
        .iter()
        .position(|header| normalize_header(header).contains(&keyword))
        .map(ColumnRef::new)
}

/// Resolve a column the adapter cannot work without
pub fn require_column(table: &SourceTable, keyword: &str) -> Result<ColumnRef> {
    find_column(table, keyword).ok_or_else(|| Error::missing_column(keyword))
}

/// Whether every keyword resolves
pub fn has_columns(table: &SourceTable, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .all(|keyword| find_column(table, keyword).is_some())
}
