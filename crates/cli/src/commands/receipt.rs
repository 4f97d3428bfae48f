//! Receipt reprint command.
//!
//! # Usage
//!
//! ```bash
//! kasir-cli receipt 20240517123005
//! ```

use std::io::Write;

use kasir_core::{Payment, TransactionId, render_receipt};
use kasir_server::db::TransactionStore;

use super::{CommandError, load_config, open_store};

/// Print the receipt of transaction `id` to `out`.
pub async fn run<W: Write>(id: &str, out: &mut W) -> Result<(), CommandError> {
    let config = load_config()?;
    let store = open_store(&config)?;
    let id = TransactionId::from_stored(id.trim());

    let transaction = store
        .find(&id)
        .await?
        .ok_or_else(|| CommandError::NotFound(id.to_string()))?;

    let receipt = render_receipt(
        &transaction,
        &Payment::recorded(transaction.payment_method),
        config.utc_offset,
    );
    out.write_all(receipt.as_bytes())?;
    Ok(())
}
