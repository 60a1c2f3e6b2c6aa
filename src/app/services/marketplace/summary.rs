//! Summary-export adapter (11번가, G마켓/옥션)
//!
//! These exports are already aggregated per period. The whole file belongs to
//! one tax category and each known payment column is summed as-is, with no
//! refund netting.

use super::Classification;
use crate::app::models::{ColumnRef, PaymentType, SourceTable, TaxCategory};
use crate::app::services::column_resolver::find_column;
use crate::app::services::normalizer::to_money;
use crate::config::ClassificationConfig;
use crate::constants::summary::{
    CARD, CASH_RECEIPT, CATEGORY, EXEMPT_MARKERS, MOBILE, OTHER, SUBTOTAL_MARKERS, TAXABLE_MARKER,
};
use crate::{Error, Result};
use tracing::debug;

/// Known payment columns of one summary export
#[derive(Debug, Clone, Copy)]
pub struct SummaryLayout {
    pub name: &'static str,
    pub columns: &'static [(&'static str, PaymentType)],
}

pub const ELEVEN_STREET_LAYOUT: SummaryLayout = SummaryLayout {
    name: "11번가",
    columns: &[
        (CARD, PaymentType::Card),
        (CASH_RECEIPT, PaymentType::Cash),
        (OTHER, PaymentType::Other),
    ],
};

pub const GMARKET_LAYOUT: SummaryLayout = SummaryLayout {
    name: "G마켓",
    columns: &[
        (CARD, PaymentType::Card),
        (CASH_RECEIPT, PaymentType::Cash),
        (MOBILE, PaymentType::Other),
        (OTHER, PaymentType::Other),
    ],
};

pub fn classify(
    file_name: &str,
    table: &SourceTable,
    layout: &SummaryLayout,
    rules: &ClassificationConfig,
) -> Result<Classification> {
    let columns: Vec<(ColumnRef, PaymentType)> = layout
        .columns
        .iter()
        .filter_map(|(keyword, payment)| match find_column(table, keyword) {
            Some(column) => Some((column, *payment)),
            None => {
                debug!("{} summary has no '{}' column", layout.name, keyword);
                None
            }
        })
        .collect();

    if columns.is_empty() {
        return Err(Error::analysis(format!(
            "{} summary export has none of its payment columns",
            layout.name
        )));
    }

    let category = file_category(file_name, table, rules);
    debug!("{}: whole file classified as {:?}", file_name, category);

    let mut result = Classification::default();
    for row in table.rows() {
        if is_subtotal(&row.first().as_text()) {
            result.rows_skipped += 1;
            continue;
        }

        for (column, payment) in &columns {
            result
                .buckets
                .add(category, *payment, to_money(row.get(*column)))?;
        }
        result.rows_used += 1;
    }

    Ok(result)
}

/// Exempt when the filename or the category column says so, otherwise the
/// configured default
pub fn file_category(
    file_name: &str,
    table: &SourceTable,
    rules: &ClassificationConfig,
) -> TaxCategory {
    if rules.is_exempt_file(file_name) {
        return TaxCategory::Exempt;
    }

    let declared = find_column(table, CATEGORY).and_then(|column| {
        table
            .rows()
            .map(|row| row.get(column).as_text().into_owned())
            .find(|value| !value.is_empty())
    });

    match declared {
        Some(value) if EXEMPT_MARKERS.iter().any(|m| value.contains(m)) => TaxCategory::Exempt,
        Some(value) if value.contains(TAXABLE_MARKER) => TaxCategory::Taxable,
        _ => rules.summary_default_category,
    }
}

fn is_subtotal(first_cell: &str) -> bool {
    SUBTOTAL_MARKERS
        .iter()
        .any(|marker| first_cell.contains(marker))
}
