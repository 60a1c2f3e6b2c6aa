//! Command-line argument definitions for the VAT settlement tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::app::services::settlement_api::DateRange;
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the VAT settlement tool
///
/// Reads marketplace settlement exports and sums them into the VAT
/// declaration grid: taxable/exempt by card, cash receipt and other.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vat-settlement",
    version,
    about = "Aggregate Korean marketplace settlement exports into a VAT summary",
    long_about = "Reads settlement exports from SmartStore, Coupang, payment gateways, 11번가 and \
                  G마켓/옥션 (CSV in UTF-8 or CP949, or xls/xlsx), classifies every row as taxable \
                  or tax-exempt and by payment type, and prints the 2×3 VAT summary table. A file \
                  that cannot be read is reported and skipped; it never stops the run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Analyse settlement files and print the VAT summary
    Analyze(AnalyzeArgs),
    /// List the supported marketplaces and how each is recognised
    Formats,
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// Settlement files or directories containing them
    ///
    /// Directories are searched recursively for .csv, .txt, .tsv, .xls and
    /// .xlsx files.
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Settlement period label, e.g. "2025년 7~9월"
    ///
    /// Shown in the report title and used in the default export file name.
    #[arg(short = 'p', long = "period", value_name = "LABEL")]
    pub period: Option<String>,

    /// Export the summary table as an xlsx workbook (CSV for a .csv path)
    ///
    /// Without a value the file is named 부가세정산_<period>.xlsx and written to
    /// the configured export directory.
    #[arg(short = 'e', long = "export", value_name = "FILE")]
    pub export: Option<Option<PathBuf>>,

    /// Print the whole run as JSON instead of tables
    #[arg(long = "json")]
    pub json: bool,

    /// Path to configuration file
    ///
    /// TOML configuration file for keyword tables and loader settings. If not
    /// specified, looks for ~/.config/vat-settlement/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of files analysed concurrently
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Settlement API base URL (overrides config and environment)
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// First day to fetch from the settlement API (YYYY-MM-DD)
    #[arg(long = "api-from", value_name = "DATE", requires = "api_to")]
    pub api_from: Option<String>,

    /// Last day to fetch from the settlement API (YYYY-MM-DD)
    #[arg(long = "api-to", value_name = "DATE", requires = "api_from")]
    pub api_to: Option<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors and the final table
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl AnalyzeArgs {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(Error::configuration("--workers must be at least 1"));
        }
        self.api_range()?;
        Ok(())
    }

    /// The API date range, when both bounds were given
    pub fn api_range(&self) -> Result<Option<DateRange>> {
        match (&self.api_from, &self.api_to) {
            (Some(from), Some(to)) => DateRange::parse(from, to).map(Some),
            _ => Ok(None),
        }
    }

    /// Export target: `None` when not exporting, `Some(None)` for the default name
    pub fn export_target(&self) -> Option<Option<&PathBuf>> {
        self.export.as_ref().map(Option::as_ref)
    }

    /// Get logging level based on verbosity
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode or JSON output)
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
