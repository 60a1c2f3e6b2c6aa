//! Core data structures for settlement processing
//!
//! Defines the money type, raw table cells, the loaded source table, the
//! six-bucket per-file result and the aggregate report. Category and payment
//! type are enums so bucket access can never go through a misspelled key.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

// =============================================================================
// Money
// =============================================================================

/// Amount in the base currency unit (Korean won)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// `None` when the sum leaves the decimal range
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Left-to-right sum from zero, `None` on overflow
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts.into_iter().try_fold(Money::ZERO, Money::checked_add)
    }

    /// Format as `1,234,567원`, rounded to whole won
    pub fn format_won(&self) -> String {
        let rounded = self.0.round();
        let digits = rounded.abs().to_string();
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        format!("{}{}원", sign, group_thousands(&digits))
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_won())
    }
}

// =============================================================================
// Tax category and payment type
// =============================================================================

/// Top-level VAT reporting category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    Taxable,
    Exempt,
}

impl TaxCategory {
    pub const ALL: [TaxCategory; 2] = [TaxCategory::Taxable, TaxCategory::Exempt];

    /// Label used in the filed report
    pub fn label(&self) -> &'static str {
        match self {
            TaxCategory::Taxable => "과세",
            TaxCategory::Exempt => "면세",
        }
    }
}

/// Payment evidence type as reported on the VAT return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Card,
    Cash,
    Other,
}

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [PaymentType::Card, PaymentType::Cash, PaymentType::Other];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentType::Card => "신용카드",
            PaymentType::Cash => "현금영수증",
            PaymentType::Other => "기타",
        }
    }
}

// =============================================================================
// Source table
// =============================================================================

/// Untyped cell content as found in a settlement export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Number(Decimal),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Build a cell from raw text, treating blank text as empty
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text view of the cell, trimmed; empty cells read as ""
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Number(n) => Cow::Owned(n.normalize().to_string()),
            Cell::Text(s) => Cow::Borrowed(s.trim()),
        }
    }
}

/// Position of a resolved column within a [`SourceTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef(usize);

impl ColumnRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered rows of named columns loaded from one settlement file
///
/// Column names are kept exactly as exported (trimmed); lookups go through
/// the column resolver rather than by exact name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from raw records, using the first non-blank record
    /// after `skip_rows` as the header row
    pub fn from_records(records: Vec<Vec<Cell>>, skip_rows: usize) -> Self {
        let mut remaining = records
            .into_iter()
            .skip(skip_rows)
            .skip_while(|record| record.iter().all(Cell::is_empty));

        let headers = match remaining.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.as_text().into_owned())
                .collect(),
            None => return Self::default(),
        };

        let rows = remaining
            .filter(|record| !record.iter().all(Cell::is_empty))
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row { cells })
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    /// Cell at a resolved column; short rows read as empty
    pub fn get(&self, column: ColumnRef) -> &'a Cell {
        self.cells.get(column.index()).unwrap_or(&EMPTY_CELL)
    }

    /// Cell at an optional column; an unresolved column reads as empty
    pub fn get_opt(&self, column: Option<ColumnRef>) -> &'a Cell {
        match column {
            Some(column) => self.get(column),
            None => &EMPTY_CELL,
        }
    }

    pub fn first(&self) -> &'a Cell {
        self.cells.first().unwrap_or(&EMPTY_CELL)
    }
}

// =============================================================================
// Results
// =============================================================================

/// Six-bucket result every marketplace adapter produces for one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBucketResult {
    pub taxable_card: Money,
    pub taxable_cash: Money,
    pub taxable_other: Money,
    pub exempt_card: Money,
    pub exempt_cash: Money,
    pub exempt_other: Money,
}

impl TaxBucketResult {
    fn slot_mut(&mut self, category: TaxCategory, payment: PaymentType) -> &mut Money {
        match (category, payment) {
            (TaxCategory::Taxable, PaymentType::Card) => &mut self.taxable_card,
            (TaxCategory::Taxable, PaymentType::Cash) => &mut self.taxable_cash,
            (TaxCategory::Taxable, PaymentType::Other) => &mut self.taxable_other,
            (TaxCategory::Exempt, PaymentType::Card) => &mut self.exempt_card,
            (TaxCategory::Exempt, PaymentType::Cash) => &mut self.exempt_cash,
            (TaxCategory::Exempt, PaymentType::Other) => &mut self.exempt_other,
        }
    }

    pub fn get(&self, category: TaxCategory, payment: PaymentType) -> Money {
        match (category, payment) {
            (TaxCategory::Taxable, PaymentType::Card) => self.taxable_card,
            (TaxCategory::Taxable, PaymentType::Cash) => self.taxable_cash,
            (TaxCategory::Taxable, PaymentType::Other) => self.taxable_other,
            (TaxCategory::Exempt, PaymentType::Card) => self.exempt_card,
            (TaxCategory::Exempt, PaymentType::Cash) => self.exempt_cash,
            (TaxCategory::Exempt, PaymentType::Other) => self.exempt_other,
        }
    }

    /// Add `amount` into one bucket
    ///
    /// Fails without changing anything if the bucket or any of the totals
    /// derived from it would leave the decimal range.
    pub fn add(
        &mut self,
        category: TaxCategory,
        payment: PaymentType,
        amount: Money,
    ) -> Result<()> {
        let previous = self.get(category, payment);
        let updated = previous
            .checked_add(amount)
            .ok_or_else(|| Error::amount_overflow(category.label()))?;
        *self.slot_mut(category, payment) = updated;

        if self.checked_total().is_none() {
            *self.slot_mut(category, payment) = previous;
            return Err(Error::amount_overflow("file total"));
        }
        Ok(())
    }

    /// Add one row's card/cash/other amounts into a category
    pub fn add_payments(
        &mut self,
        category: TaxCategory,
        card: Money,
        cash: Money,
        other: Money,
    ) -> Result<()> {
        self.add(category, PaymentType::Card, card)?;
        self.add(category, PaymentType::Cash, cash)?;
        self.add(category, PaymentType::Other, other)
    }

    fn checked_category_total(&self, category: TaxCategory) -> Option<Money> {
        Money::checked_sum(
            PaymentType::ALL
                .iter()
                .map(|payment| self.get(category, *payment)),
        )
    }

    /// Same association order as `total`, so `Some` means `total` cannot overflow
    pub fn checked_total(&self) -> Option<Money> {
        let taxable = self.checked_category_total(TaxCategory::Taxable)?;
        let exempt = self.checked_category_total(TaxCategory::Exempt)?;
        Money::checked_sum([taxable, exempt])
    }

    pub fn category_total(&self, category: TaxCategory) -> Money {
        PaymentType::ALL
            .iter()
            .map(|payment| self.get(category, *payment))
            .sum()
    }

    pub fn total(&self) -> Money {
        TaxCategory::ALL
            .iter()
            .map(|category| self.category_total(*category))
            .sum()
    }
}

/// Running totals for one tax category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTotals {
    pub card: Money,
    pub cash: Money,
    pub other: Money,
}

impl PaymentTotals {
    pub fn get(&self, payment: PaymentType) -> Money {
        match payment {
            PaymentType::Card => self.card,
            PaymentType::Cash => self.cash,
            PaymentType::Other => self.other,
        }
    }

    pub fn total(&self) -> Money {
        self.card + self.cash + self.other
    }

    pub fn checked_total(&self) -> Option<Money> {
        self.card.checked_add(self.cash)?.checked_add(self.other)
    }
}

/// Aggregate over every processed source: two categories by three payment types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub taxable: PaymentTotals,
    pub exempt: PaymentTotals,
}

impl AggregateReport {
    pub fn category(&self, category: TaxCategory) -> &PaymentTotals {
        match category {
            TaxCategory::Taxable => &self.taxable,
            TaxCategory::Exempt => &self.exempt,
        }
    }

    pub(crate) fn category_mut(&mut self, category: TaxCategory) -> &mut PaymentTotals {
        match category {
            TaxCategory::Taxable => &mut self.taxable,
            TaxCategory::Exempt => &mut self.exempt,
        }
    }

    /// Column total for one payment type across both categories
    pub fn payment_total(&self, payment: PaymentType) -> Money {
        self.taxable.get(payment) + self.exempt.get(payment)
    }

    pub fn grand_total(&self) -> Money {
        self.taxable.total() + self.exempt.total()
    }

    /// `Some` when every row, column and grand total fits the decimal range
    pub fn checked_grand_total(&self) -> Option<Money> {
        for payment in PaymentType::ALL {
            self.taxable.get(payment).checked_add(self.exempt.get(payment))?;
        }
        self.taxable
            .checked_total()?
            .checked_add(self.exempt.checked_total()?)
    }
}
