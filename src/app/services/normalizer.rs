//! Numeric and text-encoding normalization
//!
//! Settlement exports mix currency suffixes, thousands separators and stray
//! whitespace into numeric cells and arrive in either UTF-8 or CP949. This
//! module turns raw cells into [`Money`] and raw bytes into text.

use crate::app::models::{Cell, Money};
use crate::{Error, Result};
use csv::ReaderBuilder;
use encoding_rs::{EUC_KR, UTF_8};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

/// Everything that cannot be part of a signed decimal amount
static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.+\-]").expect("static pattern compiles"));

/// Records inspected when probing decoded text for a table shape
const PROBE_RECORDS: usize = 10;

/// Convert a raw cell into money; never fails
///
/// Empty cells are zero, numeric cells pass through, and text keeps only
/// digits, one leading sign and the decimal point before parsing. Anything
/// that still does not parse is zero.
pub fn to_money(cell: &Cell) -> Money {
    match cell {
        Cell::Empty => Money::ZERO,
        Cell::Number(value) => Money::new(*value),
        Cell::Text(text) => parse_amount(text),
    }
}

/// Parse free text such as `"1,234,567원"` or `" -3,000 "` into money
pub fn parse_amount(text: &str) -> Money {
    let stripped = NON_NUMERIC.replace_all(text, "");
    let stripped: &str = &stripped;
    let (negative, body) = match stripped.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, stripped.strip_prefix('+').unwrap_or(stripped)),
    };

    // Signs past the leading position are noise (dates, ranges)
    let digits: String = body.chars().filter(|c| *c != '-' && *c != '+').collect();
    if digits.is_empty() {
        return Money::ZERO;
    }

    match Decimal::from_str(&digits) {
        Ok(value) if negative => Money::new(-value),
        Ok(value) => Money::new(value),
        Err(_) => Money::ZERO,
    }
}

/// Candidate text encodings for settlement exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-8, with or without a byte-order mark
    #[serde(rename = "utf-8", alias = "utf-8-sig", alias = "utf8")]
    Utf8,
    /// Windows code page 949, the superset of EUC-KR
    #[serde(rename = "cp949", alias = "euc-kr")]
    Cp949,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Cp949 => "cp949",
        }
    }

    /// Strictly decode; any malformed sequence rejects the encoding
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let (text, had_errors) = match self {
            TextEncoding::Utf8 => UTF_8.decode_with_bom_removal(bytes),
            TextEncoding::Cp949 => EUC_KR.decode_without_bom_handling(bytes),
        };

        if had_errors || text.contains('\0') {
            None
        } else {
            Some(text.into_owned())
        }
    }
}

/// Text decoded from raw bytes with the encoding and delimiter that worked
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
    pub delimiter: char,
}

/// Decode bytes with the first candidate encoding and delimiter that yield a
/// table of at least `min_columns` columns
///
/// Encodings are the outer loop, so a file that decodes under the first
/// encoding is never reinterpreted under a later one just to find a wider
/// delimiter.
pub fn decode_text(
    file_name: &str,
    bytes: &[u8],
    encodings: &[TextEncoding],
    delimiters: &[char],
    min_columns: usize,
) -> Result<DecodedText> {
    for encoding in encodings {
        let Some(text) = encoding.decode(bytes) else {
            debug!("{}: not valid {}", file_name, encoding.label());
            continue;
        };

        for delimiter in delimiters {
            let Ok(byte) = u8::try_from(*delimiter) else {
                debug!("{}: delimiter {:?} is not a single byte", file_name, delimiter);
                continue;
            };

            let width = probe_width(&text, byte);
            if width >= min_columns {
                return Ok(DecodedText {
                    text,
                    encoding: *encoding,
                    delimiter: *delimiter,
                });
            }
            debug!(
                "{}: {} with {:?} gives only {} column(s)",
                file_name,
                encoding.label(),
                delimiter,
                width
            );
        }
    }

    Err(Error::decoding(
        file_name,
        format!(
            "none of [{}] produced a table with {} or more columns",
            encodings
                .iter()
                .map(TextEncoding::label)
                .collect::<Vec<_>>()
                .join(", "),
            min_columns
        ),
    ))
}

/// Widest record among the first few records of delimited text
fn probe_width(text: &str, delimiter: u8) -> usize {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes())
        .records()
        .take(PROBE_RECORDS)
        .filter_map(|record| record.ok())
        .map(|record| record.len())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_money_currency_text() {
        assert_eq!(to_money(&Cell::from_text("1,234,567원")), Money::from(1_234_567));
        assert_eq!(to_money(&Cell::from_text("  12,000 원 ")), Money::from(12_000));
        assert_eq!(to_money(&Cell::from_text("₩3,500")), Money::from(3_500));
    }

    #[test]
    fn test_to_money_blank_and_null() {
        assert_eq!(to_money(&Cell::Empty), Money::ZERO);
        assert_eq!(to_money(&Cell::Text(String::new())), Money::ZERO);
        assert_eq!(to_money(&Cell::Text("   ".to_string())), Money::ZERO);
        assert_eq!(to_money(&Cell::Text("-".to_string())), Money::ZERO);
    }

    #[test]
    fn test_to_money_signs() {
        assert_eq!(parse_amount("-3,000"), Money::from(-3_000));
        assert_eq!(parse_amount("+3,000"), Money::from(3_000));
        assert_eq!(parse_amount(" - 1,500원"), Money::from(-1_500));
    }

    #[test]
    fn test_to_money_noise_never_fails() {
        assert_eq!(parse_amount("N/A"), Money::ZERO);
        assert_eq!(parse_amount("1.2.3"), Money::ZERO);
        assert_eq!(parse_amount("99999999999999999999999999999999999999"), Money::ZERO);
        assert_eq!(parse_amount("합계"), Money::ZERO);
        assert_eq!(parse_amount("1,000.50원"), Money::new(Decimal::new(100050, 2)));
    }

    #[test]
    fn test_to_money_numeric_passthrough() {
        let value = Decimal::new(-4200, 0);
        assert_eq!(to_money(&Cell::Number(value)), Money::new(value));
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("상품명,금액\n쌀,1000\n".as_bytes());

        let decoded = decode_text("bom.csv", &bytes, &[TextEncoding::Utf8], &[','], 2).unwrap();

        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert_eq!(decoded.delimiter, ',');
        assert!(decoded.text.starts_with("상품명"));
    }

    #[test]
    fn test_decode_falls_back_to_cp949() {
        let (bytes, _, _) = EUC_KR.encode("상품명,금액\n쌀,1000\n");

        let decoded = decode_text(
            "legacy.csv",
            &bytes,
            &[TextEncoding::Utf8, TextEncoding::Cp949],
            &[','],
            2,
        )
        .unwrap();

        assert_eq!(decoded.encoding, TextEncoding::Cp949);
        assert!(decoded.text.contains("상품명"));
    }

    #[test]
    fn test_decode_rejects_single_column() {
        let err = decode_text(
            "narrow.csv",
            "한줄\n두줄\n".as_bytes(),
            &[TextEncoding::Utf8],
            &[',', '\t'],
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decoding { .. }));
    }

    #[test]
    fn test_decode_tries_next_delimiter() {
        let bytes = "상품명\t금액\n쌀\t1000\n".as_bytes();

        let decoded =
            decode_text("tabs.txt", bytes, &[TextEncoding::Utf8], &[',', '\t'], 2).unwrap();

        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert_eq!(decoded.delimiter, '\t');
    }
}
