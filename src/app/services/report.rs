//! Rendering and exporting the aggregate report
//!
//! The same 2×3(+total) grid backs every output: the terminal table, the
//! one-sheet workbook export, the CSV export (UTF-8 with BOM so spreadsheet
//! tools read Hangul) and the JSON document of a whole run.

use crate::app::models::{AggregateReport, Money, PaymentType, TaxCategory};
use crate::app::services::batch::{BatchStats, FileOutcome, FileStatus, SettlementRun};
use crate::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CATEGORY_HEADER: &str = "구분";
const TOTAL_LABEL: &str = "합계";
const EXPORT_PREFIX: &str = "부가세정산";
const RESULT_SHEET: &str = "최종결과";

/// Header row followed by taxable, exempt and total rows
fn grid(report: &AggregateReport) -> Vec<(String, [Money; 4])> {
    let mut rows: Vec<(String, [Money; 4])> = TaxCategory::ALL
        .iter()
        .map(|category| {
            let totals = report.category(*category);
            (
                category.label().to_string(),
                [totals.card, totals.cash, totals.other, totals.total()],
            )
        })
        .collect();

    rows.push((
        TOTAL_LABEL.to_string(),
        [
            report.payment_total(PaymentType::Card),
            report.payment_total(PaymentType::Cash),
            report.payment_total(PaymentType::Other),
            report.grand_total(),
        ],
    ));
    rows
}

fn header() -> [&'static str; 5] {
    [
        CATEGORY_HEADER,
        PaymentType::Card.label(),
        PaymentType::Cash.label(),
        PaymentType::Other.label(),
        TOTAL_LABEL,
    ]
}

/// Report title, with the settlement period when known
pub fn title(period: Option<&str>) -> String {
    match period {
        Some(period) => format!("부가세 정산 요약 ({})", period),
        None => "부가세 정산 요약".to_string(),
    }
}

/// Plain-text table for the terminal
pub fn render_table(report: &AggregateReport, period: Option<&str>) -> String {
    let mut cells: Vec<Vec<String>> = vec![header().iter().map(|h| h.to_string()).collect()];
    for (label, amounts) in grid(report) {
        let mut row = vec![label];
        row.extend(amounts.iter().map(Money::format_won));
        cells.push(row);
    }

    let widths: Vec<usize> = (0..5)
        .map(|col| {
            cells
                .iter()
                .map(|row| display_width(&row[col]))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = title(period);
    out.push('\n');
    for (index, row) in cells.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let pad = " ".repeat(widths[col] - display_width(cell));
                if col == 0 {
                    format!("{}{}", cell, pad)
                } else {
                    format!("{}{}", pad, cell)
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
        if index == 0 {
            let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
            out.push_str(&"-".repeat(rule_width));
            out.push('\n');
        }
    }
    out
}

/// One line per source: file, marketplace or failure reason
pub fn render_outcomes(run: &SettlementRun) -> String {
    let mut out = String::new();
    for outcome in &run.outcomes {
        let line = match &outcome.status {
            FileStatus::Success(analysis) => format!(
                "  OK    {}  {}  {}행  {}",
                outcome.file,
                analysis.marketplace,
                analysis.classification.rows_used,
                analysis.classification.buckets.total().format_won()
            ),
            FileStatus::Failed { reason } => format!("  FAIL  {}  {}", outcome.file, reason),
            FileStatus::Skipped { reason } => format!("  SKIP  {}  {}", outcome.file, reason),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Hangul and other wide characters take two terminal columns
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| match ch {
            '\u{1100}'..='\u{115F}' | '\u{3130}'..='\u{318F}' | '\u{AC00}'..='\u{D7A3}' => 2,
            _ => 1,
        })
        .sum()
}

/// Write the grid as CSV, BOM first; amounts are whole won without grouping
pub fn write_csv<W: Write>(mut writer: W, report: &AggregateReport) -> Result<()> {
    writer
        .write_all(UTF8_BOM)
        .map_err(|e| Error::io("Failed to write CSV byte order mark", e))?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(header())
        .map_err(|e| Error::csv_parsing("summary export", "Failed to write CSV header", Some(e)))?;

    for (label, amounts) in grid(report) {
        let mut record = vec![label];
        record.extend(amounts.iter().map(|amount| amount.amount().round().to_string()));
        csv_writer
            .write_record(&record)
            .map_err(|e| Error::csv_parsing("summary export", "Failed to write CSV row", Some(e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| Error::io("Failed to flush CSV export", e))
}

/// Export the grid to a CSV file at `path`
pub fn export_csv(path: &Path, report: &AggregateReport) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;
    write_csv(BufWriter::new(file), report)
}

/// The grid as an xlsx workbook with the single sheet `최종결과`
pub fn write_xlsx(report: &AggregateReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(RESULT_SHEET).map_err(workbook_error)?;

    for (col, label) in header().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *label)
            .map_err(workbook_error)?;
    }

    for (index, (label, amounts)) in grid(report).iter().enumerate() {
        let row = index as u32 + 1;
        worksheet
            .write_string(row, 0, label.as_str())
            .map_err(workbook_error)?;
        for (col, amount) in amounts.iter().enumerate() {
            let value = amount.amount().round().to_f64().ok_or_else(|| {
                Error::export(format!("{} does not fit a spreadsheet number", amount))
            })?;
            worksheet
                .write_number(row, col as u16 + 1, value)
                .map_err(workbook_error)?;
        }
    }

    workbook.save_to_buffer().map_err(workbook_error)
}

fn workbook_error(error: XlsxError) -> Error {
    Error::export(format!("Failed to build workbook: {}", error))
}

/// Export the grid to `path`: CSV for a `.csv` path, an xlsx workbook otherwise
pub fn export_report(path: &Path, report: &AggregateReport) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        return export_csv(path, report);
    }

    let bytes = write_xlsx(report)?;
    std::fs::write(path, bytes)
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))
}

/// `부가세정산_<period>.xlsx`, with path-hostile characters replaced
pub fn default_export_name(period: Option<&str>) -> String {
    match period.map(str::trim).filter(|p| !p.is_empty()) {
        Some(period) => {
            let safe: String = period
                .chars()
                .map(|ch| match ch {
                    '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                    ch if ch.is_whitespace() => '_',
                    ch => ch,
                })
                .collect();
            format!("{}_{}.xlsx", EXPORT_PREFIX, safe)
        }
        None => format!("{}.xlsx", EXPORT_PREFIX),
    }
}

#[derive(Serialize)]
struct RunDocument<'a> {
    period: Option<&'a str>,
    report: &'a AggregateReport,
    grand_total: Money,
    files: &'a [FileOutcome],
    stats: &'a BatchStats,
}

/// Pretty JSON document of a whole run
pub fn render_json(run: &SettlementRun, period: Option<&str>) -> Result<String> {
    let document = RunDocument {
        period,
        report: &run.report,
        grand_total: run.report.grand_total(),
        files: &run.outcomes,
        stats: &run.stats,
    };
    serde_json::to_string_pretty(&document)
        .map_err(|e| Error::export(format!("Failed to serialize report: {}", e)))
}
