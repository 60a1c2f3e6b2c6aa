//! Configuration management and validation.
//!
//! Loader strategy, classification keyword tables, concurrency and remote API
//! settings. Classification details that varied across marketplace export
//! versions live here as data rather than as hard-coded policy. Layering is
//! defaults → TOML file → environment → CLI overrides.

use crate::app::models::{PaymentType, TaxCategory};
use crate::app::services::column_resolver::normalize_header;
use crate::app::services::normalizer::TextEncoding;
use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_CARD_KEYWORDS, DEFAULT_CASH_KEYWORDS,
    DEFAULT_EXEMPT_FILE_TOKENS, DEFAULT_EXEMPT_PRODUCT_KEYWORDS, DEFAULT_HEADER_OFFSET_ROWS,
    DEFAULT_MIN_COLUMNS, DEFAULT_TAXABLE_PRODUCT_KEYWORDS, GMARKET_TOKENS, remote_fields,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the remote API base URL
pub const ENV_API_URL: &str = "VAT_SETTLEMENT_API_URL";

/// Environment variable overriding the concurrent file limit
pub const ENV_WORKERS: &str = "VAT_SETTLEMENT_WORKERS";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub classification: ClassificationConfig,
    pub processing: ProcessingConfig,
    pub api: ApiConfig,
    pub output: OutputConfig,
}

/// Tabular loader strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Candidate encodings, tried in order
    pub encodings: Vec<TextEncoding>,

    /// Candidate field delimiters, tried in order for each encoding
    pub delimiters: Vec<char>,

    /// Parses narrower than this are rejected as garbage
    pub min_columns: usize,

    /// Rows skipped before the header row in header-offset exports
    pub header_offset_rows: usize,

    /// Filename fragments that mark a header-offset export
    pub header_offset_tokens: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            encodings: vec![TextEncoding::Utf8, TextEncoding::Cp949],
            delimiters: vec![',', '\t'],
            min_columns: DEFAULT_MIN_COLUMNS,
            header_offset_rows: DEFAULT_HEADER_OFFSET_ROWS,
            header_offset_tokens: to_strings(GMARKET_TOKENS),
        }
    }
}

impl LoaderConfig {
    /// Rows to skip before the header for this file name
    pub fn skip_rows_for(&self, file_name: &str) -> usize {
        if contains_any(file_name, &self.header_offset_tokens) {
            self.header_offset_rows
        } else {
            0
        }
    }
}

/// Keyword tables driving row and file classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Product-name fragments that make a direct-channel sale tax-exempt
    pub exempt_product_keywords: Vec<String>,

    /// Product-name fragments that keep a sale taxable even when an exempt
    /// fragment also matches
    pub taxable_product_keywords: Vec<String>,

    /// Payment-method fragments mapped to card
    pub card_keywords: Vec<String>,

    /// Payment-method fragments mapped to cash receipt
    pub cash_keywords: Vec<String>,

    /// Filename fragments marking a whole summary export as exempt
    pub exempt_file_tokens: Vec<String>,

    /// Category of a summary export with no exempt signal
    pub summary_default_category: TaxCategory,

    /// Field names of remote API line items
    pub remote_fields: RemoteFieldMap,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            exempt_product_keywords: to_strings(DEFAULT_EXEMPT_PRODUCT_KEYWORDS),
            taxable_product_keywords: to_strings(DEFAULT_TAXABLE_PRODUCT_KEYWORDS),
            card_keywords: to_strings(DEFAULT_CARD_KEYWORDS),
            cash_keywords: to_strings(DEFAULT_CASH_KEYWORDS),
            exempt_file_tokens: to_strings(DEFAULT_EXEMPT_FILE_TOKENS),
            summary_default_category: TaxCategory::Taxable,
            remote_fields: RemoteFieldMap::default(),
        }
    }
}

impl ClassificationConfig {
    /// Category of a product by name
    ///
    /// Keywords match as substrings. A taxable keyword wins over an exempt
    /// one; with neither, the product is taxable.
    pub fn product_category(&self, product_name: &str) -> TaxCategory {
        if contains_any(product_name, &self.taxable_product_keywords) {
            TaxCategory::Taxable
        } else if contains_any(product_name, &self.exempt_product_keywords) {
            TaxCategory::Exempt
        } else {
            TaxCategory::Taxable
        }
    }

    /// Payment type from free-text payment method; card is checked first
    pub fn payment_type(&self, method: &str) -> PaymentType {
        if contains_any(method, &self.card_keywords) {
            PaymentType::Card
        } else if contains_any(method, &self.cash_keywords) {
            PaymentType::Cash
        } else {
            PaymentType::Other
        }
    }

    /// Whether a file name marks an exempt-goods summary export
    pub fn is_exempt_file(&self, file_name: &str) -> bool {
        contains_any(file_name, &self.exempt_file_tokens)
    }
}

/// Field names exposed by remote settlement API line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteFieldMap {
    pub card: String,
    pub cash: String,
    pub other: String,
    pub exempt: String,
}

impl Default for RemoteFieldMap {
    fn default() -> Self {
        Self {
            card: remote_fields::CARD.to_string(),
            cash: remote_fields::CASH.to_string(),
            other: remote_fields::OTHER.to_string(),
            exempt: remote_fields::EXEMPT.to_string(),
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Files parsed concurrently; the fold stays single-writer
    pub max_concurrent_files: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get().max(1),
        }
    }
}

/// Remote settlement API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for exported reports; current directory when unset
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Default config file location (`~/.config/vat-settlement/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))?;
        Ok(config_dir.join("vat-settlement").join("config.toml"))
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Invalid config file: {}", e)))
    }

    /// Load with layered configuration: defaults, then file, then environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                info!("Using config file: {}", path.display());
                Self::from_file(path)?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `VAT_SETTLEMENT_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                debug!("API base URL overridden from {}", ENV_API_URL);
                self.api.base_url = Some(url.trim().to_string());
            }
        }

        if let Ok(workers) = std::env::var(ENV_WORKERS) {
            self.processing.max_concurrent_files = workers.trim().parse().map_err(|_| {
                Error::configuration(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_WORKERS, workers
                ))
            })?;
        }

        Ok(())
    }

    /// Validate the assembled configuration
    pub fn validate(&self) -> Result<()> {
        if self.loader.encodings.is_empty() {
            return Err(Error::configuration("loader.encodings must not be empty"));
        }
        if self.loader.delimiters.is_empty() {
            return Err(Error::configuration("loader.delimiters must not be empty"));
        }
        if self.loader.min_columns == 0 {
            return Err(Error::configuration("loader.min_columns must be at least 1"));
        }
        if self.processing.max_concurrent_files == 0 {
            return Err(Error::configuration(
                "processing.max_concurrent_files must be at least 1",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::configuration("api.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Whitespace/case-insensitive substring match against a keyword list
fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    let haystack = normalize_header(haystack);
    keywords
        .iter()
        .map(|keyword| normalize_header(keyword))
        .any(|keyword| !keyword.is_empty() && haystack.contains(&keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.loader.encodings[0], TextEncoding::Utf8);
        assert_eq!(
            config.classification.summary_default_category,
            TaxCategory::Taxable
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [classification]
            summary_default_category = "exempt"
            cash_keywords = ["현금"]

            [processing]
            max_concurrent_files = 2
            "#,
        )
        .unwrap();

        assert_eq!(
            config.classification.summary_default_category,
            TaxCategory::Exempt
        );
        assert_eq!(config.processing.max_concurrent_files, 2);
        assert_eq!(config.loader.min_columns, DEFAULT_MIN_COLUMNS);
        // Virtual account no longer counts as cash once the table is narrowed
        assert_eq!(
            config.classification.payment_type("가상계좌"),
            PaymentType::Other
        );
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = Config::from_toml_str("[processing]\nmax_concurrent_files = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.processing.max_concurrent_files = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_payment_type_keywords() {
        let rules = ClassificationConfig::default();
        assert_eq!(rules.payment_type("신용카드"), PaymentType::Card);
        assert_eq!(rules.payment_type("CARD"), PaymentType::Card);
        assert_eq!(rules.payment_type("가상계좌"), PaymentType::Cash);
        assert_eq!(rules.payment_type("계좌 이체"), PaymentType::Cash);
        assert_eq!(rules.payment_type("휴대폰"), PaymentType::Other);
        assert_eq!(rules.payment_type(""), PaymentType::Other);
    }

    #[test]
    fn test_product_category_keywords() {
        let rules = ClassificationConfig::default();
        assert_eq!(rules.product_category("유기농 현미 10kg"), TaxCategory::Exempt);
        assert_eq!(rules.product_category("국산 고구마 5kg"), TaxCategory::Exempt);
        assert_eq!(rules.product_category("참기름 300ml"), TaxCategory::Taxable);
    }

    #[test]
    fn test_taxable_keywords_override_exempt_stems() {
        let rules = ClassificationConfig::default();
        assert_eq!(rules.product_category("태양초 고추장 500g"), TaxCategory::Taxable);
        assert_eq!(rules.product_category("현미 쌀과자"), TaxCategory::Taxable);
        assert_eq!(rules.product_category("청송 사과 5kg"), TaxCategory::Exempt);

        let rules = ClassificationConfig {
            taxable_product_keywords: Vec::new(),
            ..ClassificationConfig::default()
        };
        assert_eq!(rules.product_category("태양초 고추장 500g"), TaxCategory::Exempt);
    }

    #[test]
    fn test_header_offset_by_filename() {
        let loader = LoaderConfig::default();
        assert_eq!(loader.skip_rows_for("G마켓_정산_2025Q3.csv"), DEFAULT_HEADER_OFFSET_ROWS);
        assert_eq!(loader.skip_rows_for("쿠팡_정산.csv"), 0);
    }
}
