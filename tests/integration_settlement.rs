//! Integration tests for the settlement pipeline
//!
//! These tests write realistic settlement exports to a temporary directory,
//! read them back through `SourceFile::from_path` and run the full batch.

use calamine::{Data, Reader, Xlsx, open_workbook};
use encoding_rs::EUC_KR;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use vat_settlement::app::services::report::{default_export_name, export_report};
use vat_settlement::{Config, Marketplace, Money, SettlementBatch, SourceFile};

const SMARTSTORE_EXPORT: &str = "\
주문번호,상품주문번호,과세매출,면세매출,신용카드매출전표,현금(소득공제),현금(지출증빙),기타
2025070100001,1,\"1,500\",0,\"1,000\",500,0,0
2025070100002,1,0,200,200,0,0,0
";

const COUPANG_EXPORT: &str = "\
주문번호,과세유형,신용카드(판매),현금(판매),기타(판매),신용카드(환불),현금(환불),기타(환불)
C-20250701-1,TAX,800,0,0,100,0,0
";

fn write_cp949(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let (bytes, _, had_errors) = EUC_KR.encode(text);
    assert!(!had_errors);
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn write_utf8_bom(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(text.as_bytes());
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

async fn read_all(paths: &[std::path::PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for path in paths {
        files.push(SourceFile::from_path(path).await.unwrap());
    }
    files
}

/// Two marketplaces in two encodings fold into one report
///
/// Purpose: Validate the documented end-to-end scenario
/// Benefit: Covers loading, dispatch, both row-level adapters and the fold together
#[tokio::test]
async fn test_end_to_end_two_marketplaces() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_cp949(dir.path(), "스마트스토어_정산_202507.csv", SMARTSTORE_EXPORT),
        write_utf8_bom(dir.path(), "쿠팡_정산_202507.csv", COUPANG_EXPORT),
    ];
    let files = read_all(&paths).await;

    let run = SettlementBatch::new(Arc::new(Config::default()))
        .run(files)
        .await;

    assert_eq!(run.stats.files_succeeded, 2);
    assert_eq!(run.report.taxable.card, Money::from(1700));
    assert_eq!(run.report.taxable.cash, Money::from(500));
    assert_eq!(run.report.taxable.other, Money::ZERO);
    assert_eq!(run.report.exempt.card, Money::from(200));
    assert_eq!(run.report.exempt.cash, Money::ZERO);
    assert_eq!(run.report.exempt.other, Money::ZERO);
    assert_eq!(run.report.grand_total(), Money::from(2400));

    assert_eq!(run.outcomes[0].marketplace(), Some(Marketplace::SmartStore));
    assert_eq!(run.outcomes[1].marketplace(), Some(Marketplace::Coupang));
}

/// Unreadable and unrecognised files are reported, not fatal
///
/// Purpose: One broken export must not abort the batch
/// Benefit: Users get a report for every good file plus a reason for each bad one
#[tokio::test]
async fn test_bad_files_do_not_abort_batch() {
    let dir = TempDir::new().unwrap();
    let unsupported = dir.path().join("메모.csv");
    std::fs::write(&unsupported, "날짜,내용\n2025-07-01,회의\n").unwrap();
    let garbage = dir.path().join("쿠팡_깨진파일.csv");
    std::fs::write(&garbage, [0xFFu8, 0x00, 0xFE, 0x01, 0x80]).unwrap();
    let good = write_utf8_bom(dir.path(), "coupang_202507.csv", COUPANG_EXPORT);

    let files = read_all(&[unsupported, garbage, good]).await;
    let run = SettlementBatch::new(Arc::new(Config::default()))
        .run(files)
        .await;

    assert_eq!(run.stats.files_total, 3);
    assert_eq!(run.stats.files_failed, 2);
    assert_eq!(run.stats.files_succeeded, 1);
    assert_eq!(run.outcomes[0].reason(), Some("unsupported format"));
    assert!(run.outcomes[1].reason().is_some());
    assert_eq!(run.report.grand_total(), Money::from(700));
}

/// G마켓 exports carry metadata rows above the header
#[tokio::test]
async fn test_gmarket_summary_with_metadata_rows() {
    let dir = TempDir::new().unwrap();
    let export = "\
G마켓 정산내역
판매자: 테스트상점
조회기간: 2025-07-01 ~ 2025-09-30
출력일: 2025-10-01
,
정산월,신용카드,현금영수증,휴대폰,기타
2025-07,\"10,000\",\"2,000\",500,0
2025-08,\"5,000\",0,0,100
합계,\"15,000\",\"2,000\",500,100
";
    let path = write_cp949(dir.path(), "G마켓_부가세신고내역.csv", export);

    let files = read_all(&[path]).await;
    let run = SettlementBatch::new(Arc::new(Config::default()))
        .run(files)
        .await;

    assert_eq!(run.outcomes[0].marketplace(), Some(Marketplace::Gmarket));
    assert_eq!(run.report.taxable.card, Money::from(15000));
    assert_eq!(run.report.taxable.cash, Money::from(2000));
    assert_eq!(run.report.taxable.other, Money::from(600));
    assert!(run.report.exempt.total().is_zero());
}

/// Keyword tables come from the TOML config file
#[tokio::test]
async fn test_config_file_drives_direct_pg_classification() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[classification]
exempt_product_keywords = ["도서"]
card_keywords = ["카드"]
cash_keywords = ["계좌"]

[processing]
max_concurrent_files = 2
"#,
    )
    .unwrap();
    let config = Config::load_layered(Some(&config_path)).unwrap();
    config.validate().unwrap();

    let export = "\
주문번호,상품명,결제수단,결제금액,취소금액
T-1,여행 도서,신용카드,\"12,000\",0
T-2,쌀 10kg,가상계좌,\"30,000\",\"5,000\"
T-3,머그컵,포인트,\"3,000\",
";
    let path = write_utf8_bom(dir.path(), "토스페이먼츠_거래내역.csv", export);

    let files = read_all(&[path]).await;
    let run = SettlementBatch::new(Arc::new(config)).run(files).await;

    assert_eq!(run.report.exempt.card, Money::from(12000));
    assert_eq!(run.report.taxable.cash, Money::from(25000));
    assert_eq!(run.report.taxable.other, Money::from(3000));
}

/// The default export is a one-sheet workbook holding the summary grid
#[tokio::test]
async fn test_export_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_cp949(dir.path(), "smartstore.csv", SMARTSTORE_EXPORT);
    let files = read_all(&[path]).await;
    let run = SettlementBatch::new(Arc::new(Config::default()))
        .run(files)
        .await;

    let export_path = dir.path().join(default_export_name(Some("2025년 7~9월")));
    export_report(&export_path, &run.report).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&export_path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["최종결과".to_string()]);
    let range = workbook.worksheet_range("최종결과").unwrap();
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("과세".to_string())));
    assert_eq!(range.get_value((1, 1)), Some(&Data::Float(1000.0)));
    assert_eq!(range.get_value((2, 4)), Some(&Data::Float(200.0)));

    let csv_path = dir.path().join("summary.csv");
    export_report(&csv_path, &run.report).unwrap();
    let bytes = std::fs::read(&csv_path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(text.contains("과세,1000,500,0,1500"));
    assert!(text.contains("면세,200,0,0,200"));
}

#[tokio::test]
async fn test_from_path_missing_file() {
    let dir = TempDir::new().unwrap();

    let result = SourceFile::from_path(&dir.path().join("없음.csv")).await;

    assert!(matches!(result, Err(vat_settlement::Error::Io { .. })));
}
