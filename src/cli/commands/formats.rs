//! Formats command: list supported marketplaces and their dispatch signals

use crate::app::services::marketplace::dispatch::dispatch_rules;
use crate::app::services::marketplace::{Marketplace, SelectionSignal};
use colored::Colorize;

/// Human-readable description of a content signal
fn describe(signal: &SelectionSignal) -> Option<&'static str> {
    match signal {
        SelectionSignal::FilenameToken(_) => None,
        SelectionSignal::TaxSalesColumns => Some("과세매출 and 면세매출 columns"),
        SelectionSignal::TaxTypeColumn => Some("과세유형 column with TAX/FREE values"),
    }
}

/// One block per marketplace, in dispatch priority order
pub fn render_formats() -> String {
    let mut out = String::new();
    for marketplace in Marketplace::FILE_SOURCES {
        out.push_str(&format!("{}\n", marketplace.display_name().bold()));
        out.push_str(&format!(
            "  filename: {}\n",
            marketplace.filename_tokens().join(", ")
        ));

        let content: Vec<&str> = dispatch_rules()
            .iter()
            .filter(|rule| rule.marketplace == marketplace)
            .filter_map(|rule| describe(&rule.signal))
            .collect();
        if !content.is_empty() {
            out.push_str(&format!("  content:  {}\n", content.join("; ")));
        }
        out.push_str(&format!("  shape:    {}\n", marketplace.shape()));
    }

    let remote = Marketplace::RemoteApi;
    out.push_str(&format!("{}\n", remote.display_name().bold()));
    out.push_str("  source:   analyze --api-from DATE --api-to DATE\n");
    out.push_str(&format!("  shape:    {}\n", remote.shape()));
    out
}

pub fn run_formats() -> anyhow::Result<()> {
    print!("{}", render_formats());
    Ok(())
}
