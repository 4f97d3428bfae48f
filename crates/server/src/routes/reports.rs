//! Report route handlers.

use axum::{Json, extract::State, http::header, response::IntoResponse};
use tracing::instrument;

use kasir_core::ReportStats;

use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::export::transactions_csv;
use crate::state::AppState;

/// Name offered to the browser for the CSV download.
const CSV_FILENAME: &str = "laporan_transaksi.csv";

/// Transaction count, total income and average.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<ReportStats>> {
    Ok(Json(state.store().stats().await?))
}

/// Download the transaction history as CSV.
#[instrument(skip(state))]
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let transactions = state.store().list_all().await?;
    let body = transactions_csv(&transactions, state.utc_offset()).map_err(|e| {
        tracing::error!(error = %e, "Failed to render CSV export");
        AppError::Internal(format!("CSV export failed: {e}"))
    })?;

    tracing::info!(rows = transactions.len(), "CSV export generated");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        body,
    ))
}
