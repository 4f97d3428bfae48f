//! Cart route handlers.
//!
//! The cart lives in the session. Every handler loads it, applies one
//! mutation, stores it back and returns the repriced cart.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use kasir_core::{Cart, CartLine, LineKey, MenuItemId, Totals, format_rupiah};

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::models::session_keys;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineView {
    pub item_id: MenuItemId,
    pub variant: Option<String>,
    pub name: String,
    pub image_ref: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_subtotal: Decimal,
    pub line_subtotal_display: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let line_subtotal = line.line_subtotal();
        Self {
            item_id: line.item_id,
            variant: line.variant.clone(),
            name: line.display_name.clone(),
            image_ref: line.image_ref.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_subtotal,
            line_subtotal_display: format_rupiah(line_subtotal),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    #[serde(flatten)]
    pub totals: Totals,
    pub display: TotalsDisplay,
}

/// Totals formatted for the till screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl From<&Totals> for TotalsDisplay {
    fn from(totals: &Totals) -> Self {
        Self {
            subtotal: format_rupiah(totals.subtotal),
            tax: format_rupiah(totals.tax),
            total: format_rupiah(totals.total),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            display: TotalsDisplay::from(&totals),
            totals,
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session; a new session starts with an empty cart.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart in the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub id: i32,
    #[serde(default)]
    pub variant: Option<String>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub id: i32,
    #[serde(default)]
    pub variant: Option<String>,
    pub quantity: i64,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub id: i32,
    #[serde(default)]
    pub variant: Option<String>,
}

fn line_key(id: i32, variant: Option<&str>) -> LineKey {
    LineKey::new(MenuItemId::new(id), variant)
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add one unit of a menu item.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let line = cart.add(
        state.menu(),
        MenuItemId::new(request.id),
        request.variant.as_deref(),
    )?;
    save_cart(&session, &cart).await?;

    tracing::debug!(item = %line.display_name, quantity = line.quantity, "Added to cart");
    Ok(Json(CartView::from(&cart)))
}

/// Set the quantity of a line; zero or less removes it.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    AppJson(request): AppJson<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let key = line_key(request.id, request.variant.as_deref());
    if !cart.set_quantity(&key, request.quantity) {
        return Err(AppError::NotFound(format!(
            "cart line for item {}",
            request.id
        )));
    }
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    AppJson(request): AppJson<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let key = line_key(request.id, request.variant.as_deref());
    if cart.remove(&key).is_none() {
        return Err(AppError::NotFound(format!(
            "cart line for item {}",
            request.id
        )));
    }
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}
