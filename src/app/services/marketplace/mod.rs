//! Marketplace adapters
//!
//! One adapter per settlement data shape:
//!
//! - [`smartstore`] - per-order rows with explicit taxable/exempt amount columns
//! - [`coupang`] - per-order rows with a single TAX/FREE flag and refund columns
//! - [`direct_pg`] - payment-gateway rows classified by product name
//! - [`summary`] - pre-aggregated per-period exports (11번가, G마켓)
//! - [`remote`] - line items from the remote settlement API
//!
//! [`dispatch`] picks the adapter for a file. Every adapter returns the same
//! six-bucket [`TaxBucketResult`] or an analysis error.

pub mod coupang;
pub mod direct_pg;
pub mod dispatch;
pub mod remote;
pub mod smartstore;
pub mod summary;

#[cfg(test)]
pub mod tests;

pub use dispatch::{Detection, SelectionSignal, detect};

use crate::Result;
use crate::app::models::{SourceTable, TaxBucketResult};
use crate::config::ClassificationConfig;
use crate::constants::{
    COUPANG_TOKENS, DIRECT_PG_TOKENS, ELEVEN_STREET_TOKENS, GMARKET_TOKENS, SMARTSTORE_TOKENS,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported settlement sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marketplace {
    SmartStore,
    Coupang,
    DirectPg,
    ElevenStreet,
    Gmarket,
    RemoteApi,
}

impl Marketplace {
    /// Sources that arrive as uploaded files, in dispatch priority order
    pub const FILE_SOURCES: [Marketplace; 5] = [
        Marketplace::SmartStore,
        Marketplace::Coupang,
        Marketplace::DirectPg,
        Marketplace::ElevenStreet,
        Marketplace::Gmarket,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Marketplace::SmartStore => "스마트스토어",
            Marketplace::Coupang => "쿠팡",
            Marketplace::DirectPg => "자사몰(PG)",
            Marketplace::ElevenStreet => "11번가",
            Marketplace::Gmarket => "G마켓/옥션",
            Marketplace::RemoteApi => "정산 API",
        }
    }

    /// Lowercase filename fragments that select this source
    pub fn filename_tokens(&self) -> &'static [&'static str] {
        match self {
            Marketplace::SmartStore => SMARTSTORE_TOKENS,
            Marketplace::Coupang => COUPANG_TOKENS,
            Marketplace::DirectPg => DIRECT_PG_TOKENS,
            Marketplace::ElevenStreet => ELEVEN_STREET_TOKENS,
            Marketplace::Gmarket => GMARKET_TOKENS,
            Marketplace::RemoteApi => &[],
        }
    }

    /// Short description of the data shape the adapter expects
    pub fn shape(&self) -> &'static str {
        match self {
            Marketplace::SmartStore => "per-order rows, taxable/exempt amount columns",
            Marketplace::Coupang => "per-order rows, TAX/FREE flag, sale minus refund",
            Marketplace::DirectPg => "per-transaction rows, product-name keyword rule",
            Marketplace::ElevenStreet | Marketplace::Gmarket => {
                "per-period summary rows, whole-file category"
            }
            Marketplace::RemoteApi => "API line items, exempt amount flag",
        }
    }

    /// Pick the adapter for a file; `None` means unsupported format
    pub fn detect(file_name: &str, table: &SourceTable) -> Option<Detection> {
        detect(file_name, table)
    }

    /// Run this marketplace's classification over a loaded table
    pub fn classify(
        &self,
        file_name: &str,
        table: &SourceTable,
        rules: &ClassificationConfig,
    ) -> Result<Classification> {
        match self {
            Marketplace::SmartStore => smartstore::classify(table),
            Marketplace::Coupang => coupang::classify(table),
            Marketplace::DirectPg => direct_pg::classify(table, rules),
            Marketplace::ElevenStreet => {
                summary::classify(file_name, table, &summary::ELEVEN_STREET_LAYOUT, rules)
            }
            Marketplace::Gmarket => {
                summary::classify(file_name, table, &summary::GMARKET_LAYOUT, rules)
            }
            Marketplace::RemoteApi => remote::classify(table, &rules.remote_fields),
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Adapter output: the six buckets plus row accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub buckets: TaxBucketResult,
    /// Rows that contributed to a bucket
    pub rows_used: usize,
    /// Rows ignored (no category signal, subtotal rows, blank amounts)
    pub rows_skipped: usize,
}
