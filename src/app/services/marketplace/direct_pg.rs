//! Direct-channel (payment gateway) adapter
//!
//! Gateway exports know nothing about VAT. Each transaction is exempt when its
//! product name contains a configured exempt-goods keyword and taxable
//! otherwise; the payment bucket comes from the free-text payment method.

use super::Classification;
use crate::app::models::SourceTable;
use crate::app::services::column_resolver::{find_column, require_column};
use crate::app::services::normalizer::to_money;
use crate::config::ClassificationConfig;
use crate::constants::direct_pg::{CANCELLED_AMOUNT, PAID_AMOUNT, PAYMENT_METHOD, PRODUCT_NAME};
use crate::{Error, Result};

pub fn classify(table: &SourceTable, rules: &ClassificationConfig) -> Result<Classification> {
    let product = require_column(table, PRODUCT_NAME)?;
    let method = require_column(table, PAYMENT_METHOD)?;
    let paid = require_column(table, PAID_AMOUNT)?;
    let cancelled = find_column(table, CANCELLED_AMOUNT);

    let mut result = Classification::default();
    for row in table.rows() {
        if row.get(paid).is_empty() {
            result.rows_skipped += 1;
            continue;
        }

        let category = rules.product_category(&row.get(product).as_text());
        let payment = rules.payment_type(&row.get(method).as_text());
        let net = to_money(row.get(paid))
            .checked_sub(to_money(row.get_opt(cancelled)).abs())
            .ok_or_else(|| Error::amount_overflow("cancellation netting"))?;

        result.buckets.add(category, payment, net)?;
        result.rows_used += 1;
    }

    Ok(result)
}
