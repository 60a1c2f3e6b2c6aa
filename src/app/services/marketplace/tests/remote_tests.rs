//! Tests for the remote line-item adapter

use crate::Error;
use crate::app::models::Money;
use crate::app::services::marketplace::remote::{classify, table_from_line_items};
use crate::config::RemoteFieldMap;
use serde_json::json;

#[test]
fn test_exempt_amount_flags_line_item() {
    let items = vec![
        json!({"orderId": "R-1", "cardAmount": 1000, "cashAmount": 0, "etcAmount": 0, "taxFreeAmount": 0}),
        json!({"orderId": "R-2", "cardAmount": 500, "cashAmount": 300, "taxFreeAmount": 800}),
        json!({"orderId": "R-3", "cardAmount": 0, "cashAmount": "1,200", "etcAmount": 40, "taxFreeAmount": null}),
    ];
    let table = table_from_line_items(&items);

    let result = classify(&table, &RemoteFieldMap::default()).unwrap();

    assert_eq!(result.buckets.taxable_card, Money::from(1000));
    assert_eq!(result.buckets.taxable_cash, Money::from(1200));
    assert_eq!(result.buckets.taxable_other, Money::from(40));
    assert_eq!(result.buckets.exempt_card, Money::from(500));
    assert_eq!(result.buckets.exempt_cash, Money::from(300));
    assert_eq!(result.rows_used, 3);
}

#[test]
fn test_headers_are_union_of_keys() {
    let items = vec![
        json!({"a": 1, "b": 2}),
        json!({"b": 3, "c": 4}),
        json!("not an object"),
    ];

    let table = table_from_line_items(&items);

    assert_eq!(table.column_count(), 3);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn test_empty_response_is_zero() {
    let table = table_from_line_items(&[]);

    let result = classify(&table, &RemoteFieldMap::default()).unwrap();

    assert_eq!(result.buckets.total(), Money::ZERO);
}

#[test]
fn test_items_without_payment_fields_fail() {
    let table = table_from_line_items(&[json!({"orderId": "R-9", "total": 100})]);

    let result = classify(&table, &RemoteFieldMap::default());

    assert!(matches!(result, Err(Error::Analysis { .. })));
}
