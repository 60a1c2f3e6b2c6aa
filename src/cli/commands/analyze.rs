//! Analyze command implementation
//!
//! Collects settlement files, runs the batch, optionally adds the remote API
//! source, then prints and exports the aggregate.

use super::shared::{collect_source_paths, create_progress_bar, load_configuration, setup_logging};
use crate::app::services::batch::{
    FileOutcome, SettlementBatch, SettlementRun, SourceFile, analyze_line_items,
};
use crate::app::services::report::{
    default_export_name, export_report, render_json, render_outcomes, render_table,
};
use crate::app::services::settlement_api::{DateRange, SettlementApiClient};
use crate::cli::args::AnalyzeArgs;
use crate::config::Config;
use crate::constants::REMOTE_SOURCE_NAME;
use crate::{Error, Result};
use anyhow::Context;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Analyze command runner
///
/// 1. Set up logging and configuration
/// 2. Read every settlement file
/// 3. Run the batch (and the remote API source when a date range is given)
/// 4. Print the summary, export it if asked
pub async fn run_analyze(args: AnalyzeArgs, token: CancellationToken) -> anyhow::Result<()> {
    setup_logging(args.get_log_level(), args.quiet)?;
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = Arc::new(load_configuration(&args).context("Failed to load configuration")?);
    let api_range = args.api_range()?;

    let paths = collect_source_paths(&args.paths).context("Failed to collect settlement files")?;
    if paths.is_empty() {
        warn!("No settlement files found under the given paths");
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = SourceFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }
    info!("Read {} settlement files", files.len());

    let mut batch = SettlementBatch::new(Arc::clone(&config)).with_cancellation(token.clone());
    if args.show_progress() && !files.is_empty() {
        batch = batch.with_progress(create_progress_bar(
            files.len() as u64,
            "Analysing settlement files",
        ));
    }
    let mut run = batch.run(files).await;

    if let Some(range) = api_range {
        let outcome = if token.is_cancelled() {
            FileOutcome::skipped(REMOTE_SOURCE_NAME, "processing cancelled")
        } else {
            analyze_remote(&config, &range).await
        };
        run.record(outcome);
    }

    let period = args.period.as_deref();
    if args.json {
        println!("{}", render_json(&run, period)?);
    } else {
        print_human_report(&run, period, args.quiet);
    }

    if let Some(target) = args.export_target() {
        let path = export_path(&config, target, period);
        export_report(&path, &run.report)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        if !args.json {
            println!("{} {}", "Exported".bright_green(), path.display());
        }
    }

    if token.is_cancelled() {
        return Err(Error::processing_interrupted(format!(
            "cancelled after {} of {} sources",
            run.stats.files_succeeded + run.stats.files_failed,
            run.stats.files_total
        ))
        .into());
    }

    Ok(())
}

/// Fetch and classify the remote source; failures become a failed outcome
async fn analyze_remote(config: &Config, range: &DateRange) -> FileOutcome {
    info!("Fetching settlement API line items for {}", range);
    let result: Result<_> = async {
        let client = SettlementApiClient::new(&config.api)?;
        let items = client.fetch_line_items(range).await?;
        analyze_line_items(&items, config)
    }
    .await;

    FileOutcome::from_result(REMOTE_SOURCE_NAME, result)
}

fn export_path(config: &Config, target: Option<&PathBuf>, period: Option<&str>) -> PathBuf {
    match target {
        Some(path) => path.clone(),
        None => config
            .output
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(default_export_name(period)),
    }
}

fn print_human_report(run: &SettlementRun, period: Option<&str>, quiet: bool) {
    println!();
    print!("{}", render_table(&run.report, period));

    if quiet {
        return;
    }

    if !run.outcomes.is_empty() {
        println!("\n{}", "Sources".bright_cyan());
        print!("{}", render_outcomes(run));
    }

    if run.stats.files_failed > 0 {
        println!(
            "\n{} {} source(s) contributed nothing; see the reasons above",
            "Warning:".yellow().bold(),
            run.stats.files_failed
        );
    }
    println!("\n{}", run.stats.summary().dimmed());
}
