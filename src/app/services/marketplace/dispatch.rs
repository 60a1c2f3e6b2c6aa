//! Adapter selection
//!
//! An explicit, ordered list of `(signal, marketplace)` rules. Filename tokens
//! are evaluated first; a single filename match wins outright. When filenames
//! match no marketplace or several, content signatures decide, and an
//! ambiguous filename with no content signature falls back to the
//! highest-priority filename match.

use super::Marketplace;
use crate::app::models::SourceTable;
use crate::app::services::column_resolver::{find_column, has_columns, normalize_header};
use crate::constants::{coupang, smartstore};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

/// Evidence used to pick an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectionSignal {
    /// Filename contains the token (whitespace/case-insensitive)
    FilenameToken(&'static str),
    /// Both taxable-sales and exempt-sales columns are present
    TaxSalesColumns,
    /// A tax-type column holding TAX/FREE values is present
    TaxTypeColumn,
}

impl SelectionSignal {
    pub fn is_filename(&self) -> bool {
        matches!(self, SelectionSignal::FilenameToken(_))
    }

    /// Evaluate against a normalized file name and the loaded table
    fn matches(&self, normalized_name: &str, table: &SourceTable) -> bool {
        match self {
            SelectionSignal::FilenameToken(token) => {
                normalized_name.contains(&normalize_header(token))
            }
            SelectionSignal::TaxSalesColumns => has_columns(
                table,
                &[smartstore::TAXABLE_SALES, smartstore::EXEMPT_SALES],
            ),
            SelectionSignal::TaxTypeColumn => {
                let Some(column) = find_column(table, coupang::TAX_TYPE) else {
                    return false;
                };
                table.rows().any(|row| {
                    let value = row.get(column).as_text();
                    value.eq_ignore_ascii_case(coupang::TAXABLE_VALUE)
                        || value.eq_ignore_ascii_case(coupang::EXEMPT_VALUE)
                })
            }
        }
    }
}

/// One prioritized dispatch rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRule {
    pub signal: SelectionSignal,
    pub marketplace: Marketplace,
}

/// The adapter chosen for a file and the signal that chose it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub marketplace: Marketplace,
    pub signal: SelectionSignal,
}

static DISPATCH_RULES: LazyLock<Vec<DispatchRule>> = LazyLock::new(|| {
    let filename_rules = Marketplace::FILE_SOURCES.into_iter().flat_map(|marketplace| {
        marketplace
            .filename_tokens()
            .iter()
            .map(move |token| DispatchRule {
                signal: SelectionSignal::FilenameToken(*token),
                marketplace,
            })
    });

    let content_rules = [
        DispatchRule {
            signal: SelectionSignal::TaxSalesColumns,
            marketplace: Marketplace::SmartStore,
        },
        DispatchRule {
            signal: SelectionSignal::TaxTypeColumn,
            marketplace: Marketplace::Coupang,
        },
    ];

    filename_rules.chain(content_rules).collect()
});

/// The full rule list in evaluation order
pub fn dispatch_rules() -> &'static [DispatchRule] {
    &DISPATCH_RULES
}

/// Pick the adapter for a file; `None` means unsupported format
pub fn detect(file_name: &str, table: &SourceTable) -> Option<Detection> {
    let normalized_name = normalize_header(file_name);

    let mut filename_matches: Vec<Detection> = Vec::new();
    for rule in dispatch_rules().iter().filter(|rule| rule.signal.is_filename()) {
        if filename_matches
            .iter()
            .any(|found| found.marketplace == rule.marketplace)
        {
            continue;
        }
        if rule.signal.matches(&normalized_name, table) {
            filename_matches.push(Detection {
                marketplace: rule.marketplace,
                signal: rule.signal,
            });
        }
    }

    if let [only] = filename_matches.as_slice() {
        return Some(*only);
    }

    if filename_matches.len() > 1 {
        debug!(
            "{}: filename matches {} marketplaces, checking content",
            file_name,
            filename_matches.len()
        );
    }

    let by_content = dispatch_rules()
        .iter()
        .filter(|rule| !rule.signal.is_filename())
        .find(|rule| rule.signal.matches(&normalized_name, table))
        .map(|rule| Detection {
            marketplace: rule.marketplace,
            signal: rule.signal,
        });

    by_content.or_else(|| filename_matches.first().copied())
}
