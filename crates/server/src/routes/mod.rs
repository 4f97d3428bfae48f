//! HTTP route handlers for the till.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database reachable)
//!
//! # Menu
//! GET  /api/menu?q=                    - Menu listing, optionally filtered by name
//!
//! # Cart (session-scoped)
//! GET  /api/cart                       - Current cart with totals
//! POST /api/cart/add                   - Add one unit of an item
//! POST /api/cart/update                - Set a line's quantity
//! POST /api/cart/remove                - Remove a line
//! POST /api/cart/clear                 - Empty the cart
//!
//! # Checkout
//! POST /api/checkout                   - Complete the sale and empty the cart
//!
//! # History and reports
//! GET  /api/transactions               - Transaction history, most recent first
//! GET  /api/transactions/{id}/receipt  - Plain-text receipt reprint
//! GET  /api/reports/stats              - Count, total income and average
//! GET  /api/reports/transactions.csv   - CSV export
//! ```

pub mod cart;
pub mod checkout;
pub mod health;
pub mod menu;
pub mod reports;
pub mod transactions;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the transaction history routes router.
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(transactions::index))
        .route("/{id}/receipt", get(transactions::receipt))
}

/// Create the report routes router.
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(reports::stats))
        .route("/transactions.csv", get(reports::export_csv))
}

/// Create all routes for the till.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/menu", get(menu::index))
        .nest("/api/cart", cart_routes())
        .route("/api/checkout", post(checkout::checkout))
        .nest("/api/transactions", transaction_routes())
        .nest("/api/reports", report_routes())
}

/// Build the full application: routes, sessions, tracing and request IDs.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::create_session_layer())
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
