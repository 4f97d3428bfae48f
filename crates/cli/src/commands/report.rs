//! Report command: statistics and transaction history.
//!
//! # Usage
//!
//! ```bash
//! kasir-cli report
//! ```

use std::fmt;
use std::io::Write;

use kasir_core::{ReportStats, TransactionSummary, aggregate, format_rupiah, summarize};
use kasir_server::db::TransactionStore;

use super::{CommandError, load_config, open_store};

/// Print the statistics block and the history table to `out`.
pub async fn run<W: Write>(out: &mut W) -> Result<(), CommandError> {
    let config = load_config()?;
    let store = open_store(&config)?;
    let transactions = store.list_all().await?;
    let stats = aggregate(&transactions);
    let summaries: Vec<TransactionSummary> = transactions
        .iter()
        .map(|tx| summarize(tx, config.utc_offset))
        .collect();

    if store.is_degraded() {
        tracing::warn!("Database unavailable; report read from the JSON file");
    }

    let mut text = String::new();
    write_report(&mut text, &stats, &summaries)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Write statistics followed by one row per transaction.
///
/// # Errors
///
/// Returns `fmt::Error` if `out` rejects a write.
pub fn write_report<W: fmt::Write>(
    out: &mut W,
    stats: &ReportStats,
    summaries: &[TransactionSummary],
) -> fmt::Result {
    writeln!(out, "Kedai Hauna - Transaction Report")?;
    writeln!(out, "Total Transactions: {}", stats.count)?;
    writeln!(out, "Total Income:       {}", format_rupiah(stats.total_income))?;
    writeln!(out, "Average:            {}", format_rupiah(stats.average))?;
    writeln!(out)?;

    if summaries.is_empty() {
        return writeln!(out, "No transactions yet.");
    }

    writeln!(
        out,
        "{:<4} {:<10} {:<8} {:<20} {:<45} {:<13} {:>12}",
        "No", "Date", "Time", "Customer", "Items", "Payment", "Total"
    )?;
    for (index, summary) in summaries.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<10} {:<8} {:<20} {:<45} {:<13} {:>12}",
            index + 1,
            summary.date,
            summary.time,
            summary.customer,
            summary.items,
            summary.payment,
            format_rupiah(summary.total),
        )?;
    }
    Ok(())
}
