//! Concurrent batch runner
//!
//! Files are parsed on the blocking pool, at most `max_concurrent_files` at a
//! time. Results flow into a single `fold` consumer, which is the only writer
//! of the running totals. Cancellation is non-preemptive: files already
//! started finish, files not yet started are recorded as skipped.

use super::stats::{FileOutcome, FileStatus, SettlementRun};
use super::{SourceFile, analyze_source};
use crate::Error;
use crate::config::Config;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs a set of source files through analysis and aggregation
pub struct SettlementBatch {
    config: Arc<Config>,
    cancellation_token: CancellationToken,
    progress: Option<ProgressBar>,
}

impl SettlementBatch {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            cancellation_token: CancellationToken::new(),
            progress: None,
        }
    }

    /// Stop starting new files once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Advance `progress` by one per finished file
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process every file; per-file failures are recorded, never returned
    ///
    /// Outcomes come back in input order regardless of completion order.
    pub async fn run(&self, files: Vec<SourceFile>) -> SettlementRun {
        let start_time = Instant::now();
        let file_count = files.len();
        let workers = self.config.processing.max_concurrent_files.max(1);

        if file_count == 0 {
            info!("No settlement files given, returning an empty report");
            return SettlementRun::default();
        }

        info!(
            "Analysing {} settlement files with {} workers",
            file_count, workers
        );

        let progress = self.progress.as_ref();
        let (mut run, order) = stream::iter(files.into_iter().enumerate())
            .map(|(index, file)| {
                let config = Arc::clone(&self.config);
                let token = self.cancellation_token.clone();
                async move { (index, analyze_file(file, config, token).await) }
            })
            .buffer_unordered(workers)
            .fold(
                (SettlementRun::default(), Vec::with_capacity(file_count)),
                |(mut run, mut order), (index, outcome)| async move {
                    log_outcome(&outcome);
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    run.record(outcome);
                    order.push(index);
                    (run, order)
                },
            )
            .await;

        let mut indexed: Vec<(usize, FileOutcome)> =
            order.into_iter().zip(run.outcomes.drain(..)).collect();
        indexed.sort_by_key(|(index, _)| *index);
        run.outcomes = indexed.into_iter().map(|(_, outcome)| outcome).collect();
        run.stats.processing_time_ms = start_time.elapsed().as_millis();

        if let Some(pb) = progress {
            pb.finish_with_message(format!(
                "{} of {} files analysed",
                run.stats.files_succeeded, file_count
            ));
        }

        info!(
            "Batch complete: {} succeeded, {} failed, {} skipped in {:.2}s",
            run.stats.files_succeeded,
            run.stats.files_failed,
            run.stats.files_skipped,
            start_time.elapsed().as_secs_f64()
        );

        run
    }
}

/// Analyse one file on the blocking pool
async fn analyze_file(file: SourceFile, config: Arc<Config>, token: CancellationToken) -> FileOutcome {
    if token.is_cancelled() {
        return FileOutcome::skipped(file.name, "processing cancelled");
    }

    let name = file.name.clone();
    let result = match task::spawn_blocking(move || analyze_source(&file, &config)).await {
        Ok(result) => result,
        Err(join_error) => Err(Error::analysis(format!(
            "worker task failed: {}",
            join_error
        ))),
    };

    FileOutcome::from_result(name, result)
}

fn log_outcome(outcome: &FileOutcome) {
    match &outcome.status {
        FileStatus::Success(analysis) => info!(
            "{}: {} ({} rows used, {} skipped), total {}",
            outcome.file,
            analysis.marketplace,
            analysis.classification.rows_used,
            analysis.classification.rows_skipped,
            analysis.classification.buckets.total().format_won()
        ),
        FileStatus::Failed { reason } => warn!("{}: failed: {}", outcome.file, reason),
        FileStatus::Skipped { reason } => warn!("{}: skipped: {}", outcome.file, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Money;
    use crate::app::services::marketplace::Marketplace;

    fn smartstore_file(name: &str, card: impl std::fmt::Display) -> SourceFile {
        let csv = format!(
            "주문번호,과세매출,면세매출,신용카드매출전표\nA-1,{card},0,{card}\n",
            card = card
        );
        SourceFile::new(name, csv.into_bytes())
    }

    fn test_config(workers: usize) -> Arc<Config> {
        let mut config = Config::default();
        config.processing.max_concurrent_files = workers;
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_zero_files_gives_empty_report() {
        let run = SettlementBatch::new(test_config(2)).run(Vec::new()).await;

        assert!(run.report.grand_total().is_zero());
        assert!(run.outcomes.is_empty());
        assert_eq!(run.stats.files_total, 0);
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order() {
        let files = (1..=8)
            .map(|i| smartstore_file(&format!("스마트스토어_{}.csv", i), i * 100))
            .collect();

        let run = SettlementBatch::new(test_config(4)).run(files).await;

        let names: Vec<&str> = run.outcomes.iter().map(|o| o.file.as_str()).collect();
        let expected: Vec<String> = (1..=8).map(|i| format!("스마트스토어_{}.csv", i)).collect();
        assert_eq!(names, expected);
        assert_eq!(run.report.taxable.card, Money::from(3600));
        assert!(
            run.outcomes
                .iter()
                .all(|o| o.marketplace() == Some(Marketplace::SmartStore))
        );
    }

    #[tokio::test]
    async fn test_failed_file_does_not_abort_batch() {
        let files = vec![
            smartstore_file("스마트스토어_a.csv", 1000),
            SourceFile::new("unknown.csv", "x,y\n1,2\n".as_bytes()),
            smartstore_file("스마트스토어_b.csv", 500),
        ];

        let run = SettlementBatch::new(test_config(2)).run(files).await;

        assert_eq!(run.report.taxable.card, Money::from(1500));
        assert_eq!(run.stats.files_failed, 1);
        assert_eq!(run.outcomes[1].reason(), Some("unsupported format"));
    }

    #[tokio::test]
    async fn test_total_overflow_fails_one_file_not_the_run() {
        let huge = "70000000000000000000000000000";
        let files = vec![
            smartstore_file("스마트스토어_a.csv", huge),
            smartstore_file("스마트스토어_b.csv", huge),
            smartstore_file("스마트스토어_c.csv", 0),
        ];

        let run = SettlementBatch::new(test_config(2)).run(files).await;

        assert_eq!(run.stats.files_total, 3);
        assert_eq!(run.stats.files_succeeded, 2);
        assert_eq!(run.stats.files_failed, 1);
        assert_eq!(run.report.taxable.card, Money::new(huge.parse().unwrap()));
        let failure = run.failures().next().unwrap();
        assert!(failure.reason().unwrap().contains("amount overflow"));
    }

    #[tokio::test]
    async fn test_cancelled_batch_skips_files() {
        let token = CancellationToken::new();
        token.cancel();
        let files = vec![
            smartstore_file("스마트스토어_a.csv", 1000),
            smartstore_file("스마트스토어_b.csv", 500),
        ];

        let run = SettlementBatch::new(test_config(1))
            .with_cancellation(token)
            .run(files)
            .await;

        assert_eq!(run.stats.files_skipped, 2);
        assert!(run.report.grand_total().is_zero());
    }
}
