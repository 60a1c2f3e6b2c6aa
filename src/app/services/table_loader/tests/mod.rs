//! Tests for the tabular loader
//!
//! Helpers build raw export bytes in the encodings marketplaces actually use.

use encoding_rs::EUC_KR;


/// Encode text the way legacy Korean exports ship it
pub fn cp949_bytes(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = EUC_KR.encode(text);
    assert!(!had_errors, "test text must be representable in CP949");
    bytes.into_owned()
}

/// UTF-8 with a byte-order mark, as spreadsheet tools save CSV
pub fn utf8_bom_bytes(text: &str) -> Vec<u8> {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}
