//! Tests for adapter selection

use super::{COUPANG_HEADERS, SMARTSTORE_HEADERS, table};
use crate::app::services::marketplace::{Marketplace, SelectionSignal, detect};
use unicode_normalization::UnicodeNormalization;

#[test]
fn test_filename_token_selects_adapter() {
    let empty = table(&["a", "b"], &[]);

    let cases = [
        ("스마트스토어_정산_2024.csv", Marketplace::SmartStore),
        ("Coupang_settlement.csv", Marketplace::Coupang),
        ("토스페이먼츠 거래내역.csv", Marketplace::DirectPg),
        ("11번가 정산.xlsx", Marketplace::ElevenStreet),
        ("지마켓_정산.xls", Marketplace::Gmarket),
        ("ESM_PLUS_정산.xlsx", Marketplace::Gmarket),
    ];

    for (file_name, expected) in cases {
        let detection = detect(file_name, &empty).unwrap();
        assert_eq!(detection.marketplace, expected, "{}", file_name);
        assert!(detection.signal.is_filename());
    }
}

#[test]
fn test_filename_match_ignores_spacing_and_case() {
    let empty = table(&["a", "b"], &[]);

    let detection = detect("SMART STORE 2024.csv", &empty).unwrap();

    assert_eq!(detection.marketplace, Marketplace::SmartStore);
    assert_eq!(detection.signal, SelectionSignal::FilenameToken("smartstore"));
}

#[test]
fn test_decomposed_filename_selects_adapter() {
    let empty = table(&["a", "b"], &[]);

    let cases = [
        ("스마트스토어_정산.csv", Marketplace::SmartStore),
        ("토스페이먼츠_거래내역.csv", Marketplace::DirectPg),
        ("11번가_정산.xlsx", Marketplace::ElevenStreet),
        ("G마켓_부가세신고내역.xlsx", Marketplace::Gmarket),
    ];

    for (composed, expected) in cases {
        let decomposed: String = composed.nfd().collect();
        assert_ne!(decomposed, composed);

        let detection = detect(&decomposed, &empty).unwrap();
        assert_eq!(detection.marketplace, expected, "{}", composed);
        assert!(detection.signal.is_filename());
    }
}

#[test]
fn test_content_signature_fallback() {
    let smartstore = table(SMARTSTORE_HEADERS, &[&["A-1", "1000", "0", "1000", "0", "0", "0"]]);
    let coupang = table(COUPANG_HEADERS, &[&["C-1", "TAX", "1000", "0", "0", "0", "0", "0"]]);

    let detection = detect("export.csv", &smartstore).unwrap();
    assert_eq!(detection.marketplace, Marketplace::SmartStore);
    assert_eq!(detection.signal, SelectionSignal::TaxSalesColumns);

    let detection = detect("export.csv", &coupang).unwrap();
    assert_eq!(detection.marketplace, Marketplace::Coupang);
    assert_eq!(detection.signal, SelectionSignal::TaxTypeColumn);
}

#[test]
fn test_tax_type_column_needs_known_values() {
    let table = table(&["과세유형", "금액"], &[&["ZERO", "1000"]]);

    assert!(detect("export.csv", &table).is_none());
}

#[test]
fn test_ambiguous_filename_resolved_by_content() {
    let coupang = table(COUPANG_HEADERS, &[&["C-1", "FREE", "1000", "0", "0", "0", "0", "0"]]);

    let detection = detect("쿠팡_스마트스토어_비교.csv", &coupang).unwrap();

    assert_eq!(detection.marketplace, Marketplace::Coupang);
    assert_eq!(detection.signal, SelectionSignal::TaxTypeColumn);
}

#[test]
fn test_ambiguous_filename_without_content_uses_priority() {
    let empty = table(&["a", "b"], &[]);

    let detection = detect("쿠팡_스마트스토어_비교.csv", &empty).unwrap();

    assert_eq!(detection.marketplace, Marketplace::SmartStore);
    assert!(detection.signal.is_filename());
}

#[test]
fn test_unrecognized_file_is_unsupported() {
    let table = table(&["날짜", "메모"], &[&["2024-01-01", "hello"]]);

    assert!(detect("notes.csv", &table).is_none());
}
