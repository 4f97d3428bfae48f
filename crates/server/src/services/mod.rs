//! Business logic services for the server.
//!
//! # Services
//!
//! - `checkout` - Payment settlement, transaction finalization and storage

pub mod checkout;

pub use checkout::{
    CashTendered, CheckoutRequest, CheckoutService, CheckoutServiceError, CompletedCheckout,
};
