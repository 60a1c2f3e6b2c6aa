//! Application constants for the settlement processor
//!
//! Column keywords, filename tokens and loader defaults for every supported
//! marketplace export. Keywords are matched after whitespace/case
//! normalization, so they are written the way the exports spell them.

// =============================================================================
// Loader Defaults
// =============================================================================

/// Minimum number of columns for a parse to count as a real table
pub const DEFAULT_MIN_COLUMNS: usize = 2;

/// Metadata rows preceding the header row in header-offset exports
pub const DEFAULT_HEADER_OFFSET_ROWS: usize = 5;

/// Request timeout for the remote settlement API
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// File extensions picked up when a directory is given as input
pub const SETTLEMENT_FILE_EXTENSIONS: &[&str] = &["csv", "txt", "tsv", "xls", "xlsx"];

/// Leading bytes of a zip container (xlsx)
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Leading bytes of an OLE compound document (legacy xls)
pub const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

// =============================================================================
// Marketplace Filename Tokens
// =============================================================================

pub const SMARTSTORE_TOKENS: &[&str] = &["스마트스토어", "smartstore"];
pub const COUPANG_TOKENS: &[&str] = &["쿠팡", "coupang"];
pub const DIRECT_PG_TOKENS: &[&str] = &["자사몰", "토스페이먼츠", "tosspayments", "이니시스", "inicis"];
pub const ELEVEN_STREET_TOKENS: &[&str] = &["11번가", "11st"];
pub const GMARKET_TOKENS: &[&str] = &["g마켓", "지마켓", "gmarket", "옥션", "auction", "esm"];

// =============================================================================
// Column Keywords
// =============================================================================

/// SmartStore: per-order rows with explicit taxable/exempt sales columns
pub mod smartstore {
    pub const TAXABLE_SALES: &str = "과세매출";
    pub const EXEMPT_SALES: &str = "면세매출";
    pub const CARD: &str = "신용카드매출전표";
    pub const CASH_DEDUCTION: &str = "현금(소득공제)";
    pub const CASH_EVIDENCE: &str = "현금(지출증빙)";
    pub const OTHER: &str = "기타";
}

/// Coupang: per-order rows with a single tax-type flag and sale/refund pairs
pub mod coupang {
    pub const TAX_TYPE: &str = "과세유형";
    pub const TAXABLE_VALUE: &str = "TAX";
    pub const EXEMPT_VALUE: &str = "FREE";
    pub const CARD_SALE: &str = "신용카드(판매)";
    pub const CARD_REFUND: &str = "신용카드(환불)";
    pub const CASH_SALE: &str = "현금(판매)";
    pub const CASH_REFUND: &str = "현금(환불)";
    pub const OTHER_SALE: &str = "기타(판매)";
    pub const OTHER_REFUND: &str = "기타(환불)";
}

/// Direct channel: payment gateway transactions classified by product name
pub mod direct_pg {
    pub const PRODUCT_NAME: &str = "상품명";
    pub const PAYMENT_METHOD: &str = "결제수단";
    pub const PAID_AMOUNT: &str = "결제금액";
    pub const CANCELLED_AMOUNT: &str = "취소금액";
}

/// Pre-aggregated per-period summary exports
pub mod summary {
    pub const CARD: &str = "신용카드";
    pub const CASH_RECEIPT: &str = "현금영수증";
    pub const MOBILE: &str = "휴대폰";
    pub const OTHER: &str = "기타";
    pub const CATEGORY: &str = "과세구분";
    pub const EXEMPT_MARKERS: &[&str] = &["면세", "비과세"];
    pub const TAXABLE_MARKER: &str = "과세";
    /// First-cell markers of subtotal rows that would double count
    pub const SUBTOTAL_MARKERS: &[&str] = &["합계", "총계", "소계"];
}

// =============================================================================
// Classification Defaults
// =============================================================================

/// Raw agricultural and unprocessed food terms that make a product VAT-exempt
///
/// Matching is by substring, so `고추` also catches `고추장`; processed goods
/// that contain an exempt stem belong in [`DEFAULT_TAXABLE_PRODUCT_KEYWORDS`].
pub const DEFAULT_EXEMPT_PRODUCT_KEYWORDS: &[&str] = &[
    "쌀", "현미", "찹쌀", "잡곡", "보리", "콩", "팥", "감자", "고구마", "옥수수", "채소", "야채",
    "배추", "양파", "마늘", "고추", "과일", "사과", "감귤", "귤", "딸기", "포도",
    "계란", "달걀", "생닭", "한우", "돼지고기", "생선", "버섯",
];

/// Processed goods named after an exempt ingredient; checked before the exempt list
pub const DEFAULT_TAXABLE_PRODUCT_KEYWORDS: &[&str] = &[
    "고추장", "쌀과자", "쌀국수", "쌀떡볶이", "사과잼", "딸기잼", "포도잼", "주스", "감자칩",
    "고구마칩", "콩기름", "통조림",
];

/// Payment-method fragments that identify card payments
pub const DEFAULT_CARD_KEYWORDS: &[&str] = &["카드", "card"];

/// Payment-method fragments that identify cash-receipt-eligible payments
pub const DEFAULT_CASH_KEYWORDS: &[&str] = &[
    "가상계좌", "계좌", "무통장", "현금", "이체", "account", "virtual", "cash", "transfer",
];

/// Filename fragments that mark a whole summary export as tax-exempt
pub const DEFAULT_EXEMPT_FILE_TOKENS: &[&str] = &["면세", "exempt"];

/// Default field names of remote settlement API line items
pub mod remote_fields {
    pub const CARD: &str = "cardAmount";
    pub const CASH: &str = "cashAmount";
    pub const OTHER: &str = "etcAmount";
    pub const EXEMPT: &str = "taxFreeAmount";
}

/// Pseudo file name under which remote API results are logged
pub const REMOTE_SOURCE_NAME: &str = "settlement-api";
