//! Session-related types.
//!
//! The till keeps its cart in the session, so each browser has its own
//! order in progress and nothing cart-related lives in process globals.

/// Session keys for till data.
pub mod keys {
    /// Key for the serialized `kasir_core::Cart`.
    pub const CART: &str = "cart";
}
