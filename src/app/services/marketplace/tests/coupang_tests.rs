//! Tests for the Coupang adapter

use super::{COUPANG_HEADERS, table};
use crate::Error;
use crate::app::models::Money;
use crate::app::services::marketplace::coupang;

#[test]
fn test_refund_netting_per_channel() {
    let table = table(
        COUPANG_HEADERS,
        &[&["C-1", "TAX", "10,000", "0", "0", "3,000", "0", "0"]],
    );

    let result = coupang::classify(&table).unwrap();

    assert_eq!(result.buckets.taxable_card, Money::from(7000));
    assert_eq!(result.buckets.total(), Money::from(7000));
}

#[test]
fn test_negative_signed_refund_nets_the_same() {
    let table = table(
        COUPANG_HEADERS,
        &[&["C-2", "TAX", "10000", "0", "0", "-3000", "0", "0"]],
    );

    let result = coupang::classify(&table).unwrap();

    assert_eq!(result.buckets.taxable_card, Money::from(7000));
}

#[test]
fn test_tax_and_free_rows() {
    let table = table(
        COUPANG_HEADERS,
        &[
            &["C-3", "TAX", "800", "200", "50", "100", "0", "0"],
            &["C-4", "FREE", "1000", "0", "300", "0", "0", "100"],
            &["C-5", "free", "0", "400", "0", "0", "0", "0"],
        ],
    );

    let result = coupang::classify(&table).unwrap();

    assert_eq!(result.buckets.taxable_card, Money::from(700));
    assert_eq!(result.buckets.taxable_cash, Money::from(200));
    assert_eq!(result.buckets.taxable_other, Money::from(50));
    assert_eq!(result.buckets.exempt_card, Money::from(1000));
    assert_eq!(result.buckets.exempt_cash, Money::from(400));
    assert_eq!(result.buckets.exempt_other, Money::from(200));
    assert_eq!(result.rows_used, 3);
}

#[test]
fn test_unknown_tax_type_rows_are_skipped() {
    let table = table(
        COUPANG_HEADERS,
        &[
            &["C-6", "", "5000", "0", "0", "0", "0", "0"],
            &["C-7", "ZERO", "5000", "0", "0", "0", "0", "0"],
        ],
    );

    let result = coupang::classify(&table).unwrap();

    assert_eq!(result.buckets.total(), Money::ZERO);
    assert_eq!(result.rows_skipped, 2);
}

#[test]
fn test_missing_refund_columns_count_zero() {
    let table = table(
        &["과세유형", "신용카드(판매)", "현금(판매)"],
        &[&["TAX", "1000", "500"]],
    );

    let result = coupang::classify(&table).unwrap();

    assert_eq!(result.buckets.taxable_card, Money::from(1000));
    assert_eq!(result.buckets.taxable_cash, Money::from(500));
    assert_eq!(result.buckets.taxable_other, Money::ZERO);
}

#[test]
fn test_missing_tax_type_column_fails() {
    let table = table(&["신용카드(판매)", "신용카드(환불)"], &[&["1000", "0"]]);

    assert!(matches!(
        coupang::classify(&table),
        Err(Error::Analysis { .. })
    ));
}
