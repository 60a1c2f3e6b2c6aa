use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;
use vat_settlement::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Ctrl-C stops new files from starting; files in flight finish and
        // the partial report is still printed
        let shutdown_listener = {
            let token = cancellation_token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("\nReceived CTRL+C, finishing files in progress...");
                    token.cancel();
                }
            })
        };

        let result = commands::run(args, cancellation_token).await;
        shutdown_listener.abort();
        result
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("VAT Settlement - marketplace settlement exports to a VAT summary");
    println!("=================================================================");
    println!();
    println!("Reads settlement exports from Korean marketplaces and payment gateways and");
    println!("sums them into taxable/exempt totals by card, cash receipt and other payments.");
    println!();
    println!("USAGE:");
    println!("    vat-settlement <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    analyze     Analyse settlement files and print the VAT summary");
    println!("    formats     List supported marketplaces and how each is recognised");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Analyse a quarter's exports and write the summary workbook:");
    println!("    vat-settlement analyze ./2025-q3 --period \"2025년 7~9월\" --export");
    println!();
    println!("    # Include the settlement API for the same quarter:");
    println!("    vat-settlement analyze ./2025-q3 --api-from 2025-07-01 --api-to 2025-09-30");
    println!();
    println!("For detailed help on any command, use:");
    println!("    vat-settlement <COMMAND> --help");
}
