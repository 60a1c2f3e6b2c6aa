//! Per-file outcomes and run statistics

use super::FileAnalysis;
use crate::app::models::{AggregateReport, TaxBucketResult};
use crate::app::services::aggregator::fold;
use crate::app::services::marketplace::Marketplace;
use crate::{Error, Result};
use serde::Serialize;
use tracing::warn;

/// What happened to one source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Success(FileAnalysis),
    /// Decoding, load or analysis failure; the file contributed zero
    Failed { reason: String },
    /// Never started because the run was cancelled
    Skipped { reason: String },
}

/// Outcome of one source in a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn from_result(file: impl Into<String>, result: Result<FileAnalysis>) -> Self {
        let status = match result {
            Ok(analysis) => FileStatus::Success(analysis),
            Err(error) => FileStatus::Failed {
                reason: failure_reason(&error),
            },
        };
        Self {
            file: file.into(),
            status,
        }
    }

    pub fn skipped(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Success(_))
    }

    pub fn marketplace(&self) -> Option<Marketplace> {
        match &self.status {
            FileStatus::Success(analysis) => Some(analysis.marketplace),
            _ => None,
        }
    }

    /// The partial result this file contributed, if it succeeded
    pub fn buckets(&self) -> Option<&TaxBucketResult> {
        match &self.status {
            FileStatus::Success(analysis) => Some(&analysis.classification.buckets),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Failed { reason } | FileStatus::Skipped { reason } => Some(reason),
            FileStatus::Success(_) => None,
        }
    }
}

/// Per-file reason text; the file name is already on the outcome
fn failure_reason(error: &Error) -> String {
    match error {
        Error::Decoding { message, .. } | Error::Load { message, .. } => message.clone(),
        Error::Analysis { message } => message.clone(),
        other => other.to_string(),
    }
}

/// Statistics for one settlement run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub files_total: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub processing_time_ms: u128,
}

impl BatchStats {
    /// Calculate success rate percentage over every source in the run
    pub fn success_rate(&self) -> f64 {
        if self.files_total > 0 {
            (self.files_succeeded as f64 / self.files_total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Files: {} total, {} succeeded, {} failed, {} skipped ({:.1}% success rate)\n\
             Rows: {} used, {} skipped\n\
             Duration: {:.2}s",
            self.files_total,
            self.files_succeeded,
            self.files_failed,
            self.files_skipped,
            self.success_rate(),
            self.rows_used,
            self.rows_skipped,
            self.processing_time_ms as f64 / 1000.0
        )
    }
}

/// Everything a run produced: the aggregate, one outcome per source, stats
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettlementRun {
    pub report: AggregateReport,
    pub outcomes: Vec<FileOutcome>,
    pub stats: BatchStats,
}

impl SettlementRun {
    /// Record one outcome, folding its buckets into the report on success
    ///
    /// A success whose buckets would overflow the running totals is recorded
    /// as a failure and the totals stay as they were.
    pub fn record(&mut self, mut outcome: FileOutcome) {
        self.stats.files_total += 1;
        if let FileStatus::Success(analysis) = &outcome.status {
            let rows_used = analysis.classification.rows_used;
            let rows_skipped = analysis.classification.rows_skipped;
            match fold(self.report, &analysis.classification.buckets) {
                Ok(report) => {
                    self.report = report;
                    self.stats.rows_used += rows_used;
                    self.stats.rows_skipped += rows_skipped;
                }
                Err(error) => {
                    warn!("{}: {}", outcome.file, error);
                    outcome.status = FileStatus::Failed {
                        reason: failure_reason(&error),
                    };
                }
            }
        }

        match outcome.status {
            FileStatus::Success(_) => self.stats.files_succeeded += 1,
            FileStatus::Failed { .. } => self.stats.files_failed += 1,
            FileStatus::Skipped { .. } => self.stats.files_skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, FileStatus::Failed { .. }))
    }
}
