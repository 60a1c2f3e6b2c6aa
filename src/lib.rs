//! VAT Settlement Library
//!
//! A Rust library for turning heterogeneous Korean marketplace settlement
//! exports into a single value-added-tax summary split by tax category
//! (taxable / exempt) and payment type (credit card / cash receipt / other).
//!
//! This library provides tools for:
//! - Decoding settlement exports in UTF-8 or CP949 and tolerating leading junk rows
//! - Falling back to spreadsheet parsing when delimited text does not decode
//! - Resolving columns whose headers drift between export versions
//! - Per-marketplace adapters that classify rows into the six canonical buckets
//! - Folding per-file results into one aggregate report, file by file, without
//!   letting one broken export abort the batch

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod aggregator;
        pub mod batch;
        pub mod column_resolver;
        pub mod marketplace;
        pub mod normalizer;
        pub mod report;
        pub mod settlement_api;
        pub mod table_loader;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    AggregateReport, Cell, Money, PaymentType, SourceTable, TaxBucketResult, TaxCategory,
};
pub use app::services::batch::{SettlementBatch, SettlementRun, SourceFile, analyze_source};
pub use app::services::marketplace::Marketplace;
pub use config::Config;

/// Result type alias for settlement processing
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for settlement processing operations
///
/// `Decoding`, `Load` and `Analysis` are per-file failures: the batch runner
/// records them against the offending file and keeps going.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No candidate encoding produced a usable table
    #[error("Decoding error in file '{file}': {message}")]
    Decoding { file: String, message: String },

    /// The file decoded but is structurally unusable
    #[error("Load error in file '{file}': {message}")]
    Load { file: String, message: String },

    /// A required column is missing or classification failed
    #[error("Analysis error: {message}")]
    Analysis { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing or writing error
    #[error("CSV error in '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Remote settlement API failure
    #[error("Settlement API error: {message}")]
    RemoteApi {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Report export failure
    #[error("Export error: {message}")]
    Export { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create a decoding error for a file
    pub fn decoding(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decoding {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a load error for a file
    pub fn load(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an analysis error
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    /// Create an analysis error for a sum that left the decimal range
    pub fn amount_overflow(context: impl std::fmt::Display) -> Self {
        Self::analysis(format!("amount overflow in {}", context))
    }

    /// Analysis error for a file no adapter recognizes
    pub fn unsupported_format() -> Self {
        Self::analysis("unsupported format")
    }

    /// Analysis error for a missing required column
    pub fn missing_column(keyword: &str) -> Self {
        Self::analysis(format!("required column '{}' not found", keyword))
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a remote API error
    pub fn remote_api(message: impl Into<String>, source: Option<reqwest::Error>) -> Self {
        Self::RemoteApi {
            message: message.into(),
            source,
        }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::RemoteApi {
            message: "request failed".to_string(),
            source: Some(error),
        }
    }
}
