//! Menu route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kasir_core::{MenuItem, MenuItemId, format_rupiah};

use crate::state::AppState;

/// Query parameters for the menu listing.
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Menu item display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemView {
    pub id: MenuItemId,
    pub name: String,
    pub unit_price: i64,
    pub price_display: String,
    pub image_ref: String,
    pub variants: Vec<String>,
}

impl From<&MenuItem> for MenuItemView {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            unit_price: item.unit_price,
            price_display: format_rupiah(Decimal::from(item.unit_price)),
            image_ref: item.image_ref.clone(),
            variants: item.variants.clone(),
        }
    }
}

/// List the menu, optionally filtered by name.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Json<Vec<MenuItemView>> {
    let items = state
        .menu()
        .search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(MenuItemView::from)
        .collect();
    Json(items)
}
