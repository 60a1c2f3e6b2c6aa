//! Batch settlement pipeline
//!
//! A batch is a set of [`SourceFile`]s analysed independently and folded into
//! one [`AggregateReport`]. Per-file failures are recorded against the file
//! and contribute nothing; they never abort the batch.
//!
//! - [`analyze_source`] - the pure per-file pipeline: load, detect, classify
//! - [`processor`] - concurrent runner with a single-consumer fold
//! - [`stats`] - per-file outcomes and run statistics
//!
//! [`AggregateReport`]: crate::app::models::AggregateReport

pub mod processor;
pub mod stats;

pub use processor::SettlementBatch;
pub use stats::{BatchStats, FileOutcome, FileStatus, SettlementRun};

use crate::app::services::marketplace::remote::table_from_line_items;
use crate::app::services::marketplace::{Classification, Marketplace, SelectionSignal};
use crate::app::services::table_loader::{SourceFormat, TableLoader};
use crate::config::Config;
use crate::constants::REMOTE_SOURCE_NAME;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// One uploaded settlement file: its name (used for dispatch) and raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, naming it after its final path component
    pub async fn from_path(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, contents))
    }
}

/// Successful analysis of one source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileAnalysis {
    pub marketplace: Marketplace,
    /// Dispatch evidence; `None` for sources that are not dispatched (API)
    pub signal: Option<SelectionSignal>,
    pub format: SourceFormat,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Load, detect and classify one file
pub fn analyze_source(source: &SourceFile, config: &Config) -> Result<FileAnalysis> {
    let loaded = TableLoader::new(&config.loader).load(&source.name, &source.contents)?;

    let detection =
        Marketplace::detect(&source.name, &loaded.table).ok_or_else(Error::unsupported_format)?;
    debug!(
        "{}: {} selected by {:?}",
        source.name, detection.marketplace, detection.signal
    );

    let classification =
        detection
            .marketplace
            .classify(&source.name, &loaded.table, &config.classification)?;

    Ok(FileAnalysis {
        marketplace: detection.marketplace,
        signal: Some(detection.signal),
        format: loaded.format,
        classification,
    })
}

/// Classify line items fetched from the remote settlement API
pub fn analyze_line_items(items: &[Value], config: &Config) -> Result<FileAnalysis> {
    let table = table_from_line_items(items);
    debug!(
        "{}: {} line items, {} fields",
        REMOTE_SOURCE_NAME,
        table.row_count(),
        table.column_count()
    );

    let classification =
        Marketplace::RemoteApi.classify(REMOTE_SOURCE_NAME, &table, &config.classification)?;

    Ok(FileAnalysis {
        marketplace: Marketplace::RemoteApi,
        signal: None,
        format: SourceFormat::Remote,
        classification,
    })
}
