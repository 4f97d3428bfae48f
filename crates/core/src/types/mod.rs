//! Core types for Kedai Hauna.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod id;
pub mod payment;
pub mod price;
pub mod shop_time;

pub use customer::{CustomerName, CustomerNameError};
pub use id::*;
pub use payment::PaymentMethod;
pub use price::{format_rupiah, round_for_display};
pub use shop_time::{WIB_OFFSET_SECS, shop_local, wib};
