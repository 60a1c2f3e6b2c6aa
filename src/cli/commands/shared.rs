//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading, input discovery and progress
//! bars used by the command implementations.

use crate::cli::args::AnalyzeArgs;
use crate::config::Config;
use crate::constants::SETTLEMENT_FILE_EXTENSIONS;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Set up structured logging on stderr
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `log_level`.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vat_settlement={}", log_level)));

    let result = if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> env -> args)
pub fn load_configuration(args: &AnalyzeArgs) -> Result<Config> {
    info!("Loading configuration");

    let default_config_path = if args.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    if config_file.is_none() {
        info!("No config file found, using defaults and environment variables");
    }

    let mut config = Config::load_layered(config_file)?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(workers) = args.workers {
        config.processing.max_concurrent_files = workers;
    }
    if let Some(url) = &args.api_url {
        config.api.base_url = Some(url.clone());
    }
}

/// Whether a path has one of the settlement export extensions
pub fn is_settlement_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SETTLEMENT_FILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Expand the given paths into settlement files
///
/// Files named explicitly are taken as-is; directories are walked for files
/// with a settlement extension. Missing paths are an error.
pub fn collect_source_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|entry| entry.into_path())
                .filter(|entry| entry.is_file() && is_settlement_file(entry))
                .collect();
            found.sort();
            debug!("Found {} settlement files in {}", found.len(), path.display());
            files.extend(found);
        } else {
            return Err(Error::configuration(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|file| seen.insert(file.clone()));
    Ok(files)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}
