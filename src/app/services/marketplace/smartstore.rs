//! SmartStore settlement adapter
//!
//! Each order row carries a taxable-sales and an exempt-sales amount. A row is
//! taxable when its taxable sales are positive and exempt when its exempt
//! sales are positive; the two are not exclusive, so a mixed order adds its
//! payment amounts to both categories.

use super::Classification;
use crate::app::models::{SourceTable, TaxCategory};
use crate::app::services::column_resolver::{find_column, require_column};
use crate::app::services::normalizer::to_money;
use crate::constants::smartstore::{
    CARD, CASH_DEDUCTION, CASH_EVIDENCE, EXEMPT_SALES, OTHER, TAXABLE_SALES,
};
use crate::{Error, Result};
use tracing::debug;

pub fn classify(table: &SourceTable) -> Result<Classification> {
    let taxable_sales = require_column(table, TAXABLE_SALES)?;
    let exempt_sales = require_column(table, EXEMPT_SALES)?;

    // Payment columns are optional: exports drop columns with no activity
    let card = find_column(table, CARD);
    let cash_deduction = find_column(table, CASH_DEDUCTION);
    let cash_evidence = find_column(table, CASH_EVIDENCE);
    let other = find_column(table, OTHER);

    for (keyword, column) in [
        (CARD, card),
        (CASH_DEDUCTION, cash_deduction),
        (CASH_EVIDENCE, cash_evidence),
        (OTHER, other),
    ] {
        if column.is_none() {
            debug!("SmartStore export has no '{}' column, counting zero", keyword);
        }
    }

    let mut result = Classification::default();
    for row in table.rows() {
        let is_taxable = to_money(row.get(taxable_sales)).is_positive();
        let is_exempt = to_money(row.get(exempt_sales)).is_positive();
        if !is_taxable && !is_exempt {
            result.rows_skipped += 1;
            continue;
        }

        let card_amount = to_money(row.get_opt(card));
        let cash_amount = to_money(row.get_opt(cash_deduction))
            .checked_add(to_money(row.get_opt(cash_evidence)))
            .ok_or_else(|| Error::amount_overflow("cash receipt columns"))?;
        let other_amount = to_money(row.get_opt(other));

        if is_taxable {
            result
                .buckets
                .add_payments(TaxCategory::Taxable, card_amount, cash_amount, other_amount)?;
        }
        if is_exempt {
            result
                .buckets
                .add_payments(TaxCategory::Exempt, card_amount, cash_amount, other_amount)?;
        }
        result.rows_used += 1;
    }

    Ok(result)
}
