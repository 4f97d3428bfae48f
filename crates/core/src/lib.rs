//! Kasir Core - point-of-sale logic shared by every Kedai Hauna front end.
//!
//! This crate provides the cart, pricing and checkout rules used by:
//! - `server` - JSON web API with a session-scoped cart
//! - `cli` - Command-line tools for migrations, reports and exports
//!
//! # Architecture
//!
//! The core crate contains only types and pure computation - no I/O, no
//! database access, no HTTP. Persistence lives in the server crate, which
//! keeps this crate usable from any front end.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, payment methods and customer names
//! - [`menu`] - The static menu catalog
//! - [`cart`] - Cart lines keyed by item and variant
//! - [`pricing`] - Subtotal, tax and total (forward and inverse)
//! - [`checkout`] - Transaction builder and cash settlement
//! - [`report`] - Aggregate statistics and history rows
//! - [`receipt`] - Fixed-width text receipts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod menu;
pub mod pricing;
pub mod receipt;
pub mod report;
pub mod types;

pub use cart::{Cart, CartError, CartLine, LineKey};
pub use checkout::{
    CheckoutError, Payment, Transaction, TransactionIdGenerator, TransactionItem, finalize,
    parse_cash_amount, settle_cash,
};
pub use menu::{Menu, MenuItem};
pub use receipt::render_receipt;
pub use pricing::{TAX_RATE, Totals, compute, reverse};
pub use report::{ReportStats, TransactionSummary, aggregate, items_text, summarize};
pub use types::*;
