//! Checkout route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use kasir_core::{Payment, Transaction, format_rupiah};

use super::cart::{load_cart, save_cart};
use crate::db::SaveOutcome;
use crate::error::{Result, add_breadcrumb};
use crate::extract::AppJson;
use crate::services::{CheckoutRequest, CompletedCheckout};
use crate::state::AppState;

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub transaction: Transaction,
    pub payment: Payment,
    pub stored_in: SaveOutcome,
    pub message: String,
}

impl From<CompletedCheckout> for CheckoutResponse {
    fn from(done: CompletedCheckout) -> Self {
        let mut message = format!(
            "Transaction {} saved. Total {}",
            done.transaction.id,
            format_rupiah(done.transaction.total)
        );
        if let Some(change) = done.payment.change {
            message.push_str(&format!(", change {}", format_rupiah(change)));
        }
        if done.stored_in == SaveOutcome::Fallback {
            message.push_str(" (saved to backup file)");
        }

        Self {
            transaction: done.transaction,
            payment: done.payment,
            stored_in: done.stored_in,
            message,
        }
    }
}

/// Complete the sale for the session cart and empty it.
#[instrument(skip(state, session, request), fields(payment_method = %request.payment_method))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let mut cart = load_cart(&session).await?;

    add_breadcrumb(
        "checkout",
        "Checkout started",
        Some(&[("payment_method", request.payment_method.as_str())]),
    );

    let done = state
        .checkout_service()
        .checkout(&cart, &request, Utc::now())
        .await?;

    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(CheckoutResponse::from(done)))
}
