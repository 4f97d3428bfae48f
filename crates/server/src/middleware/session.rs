//! Session middleware configuration.
//!
//! Sessions live in process memory. A session only carries the cart in
//! progress, and a restart simply starts every till on an empty cart.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "kasir_session";

/// Session expiry time in seconds (one 12-hour shift).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer() -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        // The till is served over plain HTTP on the shop LAN.
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
