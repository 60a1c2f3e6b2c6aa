//! Command implementations for the VAT settlement CLI
//!
//! Each command lives in its own module:
//! - `analyze`: read settlement files, aggregate, print and export
//! - `formats`: list supported marketplaces and how they are recognised

pub mod analyze;
pub mod formats;
pub mod shared;

use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// Dispatches to the subcommand handler. `token` is cancelled on Ctrl-C;
/// commands stop starting new work but let work in flight finish.
pub async fn run(args: Args, token: CancellationToken) -> anyhow::Result<()> {
    match args.command {
        Some(Commands::Analyze(analyze_args)) => analyze::run_analyze(analyze_args, token).await,
        Some(Commands::Formats) | None => formats::run_formats(),
    }
}
