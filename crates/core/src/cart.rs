//! The shopping cart.
//!
//! A cart is an ordered list of lines keyed by `(item id, variant)`. Adding
//! the same key twice bumps the quantity; a quantity that drops to zero
//! removes the line. Totals are derived from the lines on every call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::menu::{Menu, MenuItem};
use crate::pricing::{self, Totals};
use crate::types::MenuItemId;

/// Errors raised by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested item is not on the menu.
    #[error("menu item {0} not found")]
    ItemNotFound(MenuItemId),

    /// The item does not offer the requested variant.
    #[error("menu item {item_id} has no variant '{variant}'")]
    InvalidVariant { item_id: MenuItemId, variant: String },
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub item_id: MenuItemId,
    pub variant: Option<String>,
}

impl LineKey {
    /// Build a key, treating blank variant text as no variant.
    #[must_use]
    pub fn new(item_id: MenuItemId, variant: Option<&str>) -> Self {
        let variant = variant
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        Self { item_id, variant }
    }
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: MenuItemId,
    pub variant: Option<String>,
    /// Item name with the variant appended, e.g. `Tea (Dingin)`.
    pub display_name: String,
    /// Price captured when the line was created.
    pub unit_price: i64,
    pub image_ref: String,
    pub quantity: u32,
}

impl CartLine {
    fn from_item(item: &MenuItem, variant: Option<String>) -> Self {
        let display_name = match &variant {
            Some(v) => format!("{} ({v})", item.name),
            None => item.name.clone(),
        };
        Self {
            item_id: item.id,
            variant,
            display_name,
            unit_price: item.unit_price,
            image_ref: item.image_ref.clone(),
            quantity: 1,
        }
    }

    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            item_id: self.item_id,
            variant: self.variant.clone(),
        }
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.item_id == key.item_id && self.variant == key.variant
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        pricing::line_subtotal(self.unit_price, self.quantity)
    }
}

/// Cart owned by one session or one till.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of a menu item.
    ///
    /// Returns a snapshot of the line after the change.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if `item_id` is not on the menu and
    /// `CartError::InvalidVariant` if the variant is not offered by the item.
    pub fn add(
        &mut self,
        menu: &Menu,
        item_id: MenuItemId,
        variant: Option<&str>,
    ) -> Result<CartLine, CartError> {
        let item = menu.get(item_id).ok_or(CartError::ItemNotFound(item_id))?;
        let key = LineKey::new(item_id, variant);

        if let Some(variant) = key.variant.as_deref()
            && !item.offers_variant(variant)
        {
            return Err(CartError::InvalidVariant {
                item_id,
                variant: variant.to_owned(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(&key)) {
            line.quantity = line.quantity.saturating_add(1);
            return Ok(line.clone());
        }

        let line = CartLine::from_item(item, key.variant);
        self.lines.push(line.clone());
        Ok(line)
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// Returns `false` if no line has the key.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };

        if quantity <= 0 {
            self.lines.remove(index);
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        true
    }

    /// Change a line's quantity by `delta` (the +/- buttons).
    ///
    /// Returns `false` if no line has the key.
    pub fn adjust_quantity(&mut self, key: &LineKey, delta: i64) -> bool {
        let Some(current) = self.find(key).map(|line| i64::from(line.quantity)) else {
            return false;
        };
        self.set_quantity(key, current.saturating_add(delta))
    }

    /// Remove a line, returning it if it was present.
    pub fn remove(&mut self, key: &LineKey) -> Option<CartLine> {
        self.position(key).map(|index| self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Subtotal, tax and total of the current lines.
    #[must_use]
    pub fn totals(&self) -> Totals {
        pricing::compute(self.lines.iter().map(|line| (line.unit_price, line.quantity)))
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.matches(key))
    }
}
