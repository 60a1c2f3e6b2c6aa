//! Coupang settlement adapter
//!
//! Each row is flagged TAX or FREE in a single tax-type column and carries a
//! sale and a refund amount per payment channel. A channel contributes
//! `sale - |refund|`, so exports that sign refunds negative net the same way.

use super::Classification;
use crate::app::models::{Cell, ColumnRef, Money, PaymentType, SourceTable, TaxCategory};
use crate::app::services::column_resolver::{find_column, require_column};
use crate::app::services::normalizer::to_money;
use crate::constants::coupang::{
    CARD_REFUND, CARD_SALE, CASH_REFUND, CASH_SALE, EXEMPT_VALUE, OTHER_REFUND, OTHER_SALE,
    TAX_TYPE, TAXABLE_VALUE,
};
use crate::{Error, Result};
use tracing::debug;

/// Sale/refund column pair for one payment channel
#[derive(Debug, Clone, Copy)]
struct Channel {
    payment: PaymentType,
    sale: Option<ColumnRef>,
    refund: Option<ColumnRef>,
}

pub fn classify(table: &SourceTable) -> Result<Classification> {
    let tax_type = require_column(table, TAX_TYPE)?;

    let channels = [
        Channel {
            payment: PaymentType::Card,
            sale: find_column(table, CARD_SALE),
            refund: find_column(table, CARD_REFUND),
        },
        Channel {
            payment: PaymentType::Cash,
            sale: find_column(table, CASH_SALE),
            refund: find_column(table, CASH_REFUND),
        },
        Channel {
            payment: PaymentType::Other,
            sale: find_column(table, OTHER_SALE),
            refund: find_column(table, OTHER_REFUND),
        },
    ];

    let mut result = Classification::default();
    for row in table.rows() {
        let Some(category) = parse_tax_type(row.get(tax_type)) else {
            debug!(
                "Coupang row with tax type '{}' skipped",
                row.get(tax_type).as_text()
            );
            result.rows_skipped += 1;
            continue;
        };

        for channel in &channels {
            let net = net_amount(row.get_opt(channel.sale), row.get_opt(channel.refund))?;
            result.buckets.add(category, channel.payment, net)?;
        }
        result.rows_used += 1;
    }

    Ok(result)
}

/// TAX → taxable, FREE → exempt, anything else → no category
fn parse_tax_type(cell: &Cell) -> Option<TaxCategory> {
    let value = cell.as_text();
    if value.eq_ignore_ascii_case(TAXABLE_VALUE) {
        Some(TaxCategory::Taxable)
    } else if value.eq_ignore_ascii_case(EXEMPT_VALUE) {
        Some(TaxCategory::Exempt)
    } else {
        None
    }
}

fn net_amount(sale: &Cell, refund: &Cell) -> Result<Money> {
    to_money(sale)
        .checked_sub(to_money(refund).abs())
        .ok_or_else(|| Error::amount_overflow("refund netting"))
}
