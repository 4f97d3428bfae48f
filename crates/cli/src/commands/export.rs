//! CSV export command.
//!
//! # Usage
//!
//! ```bash
//! kasir-cli export --output laporan_transaksi.csv
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use kasir_server::db::TransactionStore;
use kasir_server::export::write_transactions_csv;

use super::{CommandError, load_config, open_store};

/// Write the transaction history and summary to `output` as CSV.
///
/// Returns the number of transactions written.
pub async fn run(output: &Path) -> Result<usize, CommandError> {
    let config = load_config()?;
    let store = open_store(&config)?;
    let transactions = store.list_all().await?;

    let file = File::create(output)?;
    write_transactions_csv(BufWriter::new(file), &transactions, config.utc_offset)?;

    tracing::info!(
        rows = transactions.len(),
        output = %output.display(),
        "CSV export written"
    );
    Ok(transactions.len())
}
