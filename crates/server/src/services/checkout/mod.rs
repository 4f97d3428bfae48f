//! Checkout service.
//!
//! Turns a session cart into a stored transaction: validates the customer
//! name and tendered cash, finalizes the cart and saves the result through
//! the failover store.

mod error;

pub use error::CheckoutServiceError;

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasir_core::{
    Cart, CheckoutError, CustomerName, Payment, PaymentMethod, Transaction,
    TransactionIdGenerator, finalize, parse_cash_amount,
};

use crate::db::{FailoverStore, SaveOutcome, TransactionStore};

/// Cash handed over by the customer, as typed (`"60,000"`) or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CashTendered {
    Amount(i64),
    Text(String),
}

impl CashTendered {
    /// Parse into an amount of whole rupiah.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidAmount` for negative or non-numeric input.
    pub fn amount(&self) -> Result<Decimal, CheckoutError> {
        match self {
            Self::Amount(amount) if *amount >= 0 => Ok(Decimal::from(*amount)),
            Self::Amount(amount) => Err(CheckoutError::InvalidAmount(format!(
                "{amount} is negative"
            ))),
            Self::Text(text) => parse_cash_amount(text),
        }
    }
}

/// What the cashier submits at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub cash_tendered: Option<CashTendered>,
}

/// A stored sale.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedCheckout {
    pub transaction: Transaction,
    pub payment: Payment,
    pub stored_in: SaveOutcome,
}

/// Checkout service.
pub struct CheckoutService<'a, P, F> {
    store: &'a FailoverStore<P, F>,
    ids: &'a Mutex<TransactionIdGenerator>,
}

impl<'a, P, F> CheckoutService<'a, P, F>
where
    P: TransactionStore,
    F: TransactionStore,
{
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        store: &'a FailoverStore<P, F>,
        ids: &'a Mutex<TransactionIdGenerator>,
    ) -> Self {
        Self { store, ids }
    }

    /// Complete a sale for `cart` at `now`.
    ///
    /// The cart is not modified; the caller clears it once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutServiceError::Rejected` for an empty cart or bad or
    /// insufficient cash, `CheckoutServiceError::CustomerName` for an
    /// over-long name, and `CheckoutServiceError::Store` when no store
    /// accepted the transaction.
    pub async fn checkout(
        &self,
        cart: &Cart,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<CompletedCheckout, CheckoutServiceError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        let customer_name = CustomerName::parse(request.customer_name.as_deref())?;
        let tendered = request
            .cash_tendered
            .as_ref()
            .map(CashTendered::amount)
            .transpose()?;
        let payment = Payment::settle(request.payment_method, cart.totals().total, tendered)?;

        let transaction = {
            let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
            finalize(cart, request.payment_method, customer_name, &mut ids, now)?
        };

        let stored_in = self.store.save_with_outcome(&transaction).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            payment_method = %transaction.payment_method,
            total = %transaction.total,
            stored_in = stored_in.as_str(),
            "Checkout completed"
        );

        Ok(CompletedCheckout {
            transaction,
            payment,
            stored_in,
        })
    }
}
