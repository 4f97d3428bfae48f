//! Transaction history route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::instrument;

use kasir_core::{Payment, TransactionId, TransactionSummary, render_receipt, summarize};

use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List every stored transaction, most recent first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<TransactionSummary>>> {
    let transactions = state.store().list_all().await?;
    let utc_offset = state.utc_offset();
    Ok(Json(
        transactions
            .iter()
            .map(|tx| summarize(tx, utc_offset))
            .collect(),
    ))
}

/// Reprint the receipt of a stored transaction.
///
/// Tendered cash is not stored, so reprints show the method without the
/// amount paid or change.
#[instrument(skip(state))]
pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = TransactionId::from_stored(id);
    let transaction = state
        .store()
        .find(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

    let text = render_receipt(
        &transaction,
        &Payment::recorded(transaction.payment_method),
        state.utc_offset(),
    );
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    ))
}
