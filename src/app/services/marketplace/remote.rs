//! Remote settlement API adapter
//!
//! API line items are flattened into a [`SourceTable`] so they go through the
//! same column resolution as uploaded files. A line item is exempt when its
//! exempt amount is positive; its card/cash/other amounts land in that
//! category.

use super::Classification;
use crate::app::models::{Cell, SourceTable, TaxCategory};
use crate::app::services::column_resolver::find_column;
use crate::app::services::normalizer::to_money;
use crate::config::RemoteFieldMap;
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde_json::Value;

pub fn classify(table: &SourceTable, fields: &RemoteFieldMap) -> Result<Classification> {
    let card = find_column(table, &fields.card);
    let cash = find_column(table, &fields.cash);
    let other = find_column(table, &fields.other);
    let exempt = find_column(table, &fields.exempt);

    if card.is_none() && cash.is_none() && other.is_none() && !table.is_empty() {
        return Err(Error::analysis(format!(
            "line items carry none of the payment fields '{}', '{}', '{}'",
            fields.card, fields.cash, fields.other
        )));
    }

    let mut result = Classification::default();
    for row in table.rows() {
        let category = if to_money(row.get_opt(exempt)).is_positive() {
            TaxCategory::Exempt
        } else {
            TaxCategory::Taxable
        };

        result.buckets.add_payments(
            category,
            to_money(row.get_opt(card)),
            to_money(row.get_opt(cash)),
            to_money(row.get_opt(other)),
        )?;
        result.rows_used += 1;
    }

    Ok(result)
}

/// Flatten JSON line items into a table; headers are the union of object
/// keys in first-seen order. Non-object items are ignored.
pub fn table_from_line_items(items: &[Value]) -> SourceTable {
    let mut headers: Vec<String> = Vec::new();
    for item in items {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map(cell_from_json).unwrap_or_default())
                .collect()
        })
        .collect();

    SourceTable::new(headers, rows)
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Cell::Number(Decimal::from(integer)),
            None => number
                .as_f64()
                .and_then(|float| Decimal::try_from(float).ok())
                .map(Cell::Number)
                .unwrap_or_default(),
        },
        Value::String(text) => Cell::from_text(text),
        other => Cell::from_text(&other.to_string()),
    }
}
