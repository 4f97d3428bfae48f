//! Checkout service error types.

use thiserror::Error;

use kasir_core::{CheckoutError, CustomerNameError};

use crate::db::StoreError;

/// Errors that can occur while completing a sale.
#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    /// The sale was rejected before anything was stored.
    #[error(transparent)]
    Rejected(#[from] CheckoutError),

    /// Customer name rejected.
    #[error(transparent)]
    CustomerName(#[from] CustomerNameError),

    /// Neither store accepted the transaction.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
