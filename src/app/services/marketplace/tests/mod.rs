//! Test utilities for marketplace adapter testing
//!
//! Tables are built directly from string cells so each test reads like the
//! export it models.

use crate::app::models::{Cell, SourceTable};

mod coupang_tests;
mod dispatch_tests;
mod remote_tests;

/// Build a table from header names and rows of raw cell text
pub fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
    SourceTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| Cell::from_text(cell)).collect())
            .collect(),
    )
}

/// Full SmartStore header row as exported
pub const SMARTSTORE_HEADERS: &[&str] = &[
    "주문번호",
    "과세매출",
    "면세매출",
    "신용카드매출전표",
    "현금(소득공제)",
    "현금(지출증빙)",
    "기타",
];

/// Full Coupang header row as exported
pub const COUPANG_HEADERS: &[&str] = &[
    "주문번호",
    "과세유형",
    "신용카드(판매)",
    "현금(판매)",
    "기타(판매)",
    "신용카드(환불)",
    "현금(환불)",
    "기타(환불)",
];
