//! The menu catalog.
//!
//! Menu items are defined once at start-up and never mutated. Items with
//! variants (hot or iced tea) are sold as distinct cart lines per variant.

use serde::{Deserialize, Serialize};

use crate::types::MenuItemId;

/// A sellable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    /// Price in whole rupiah.
    pub unit_price: i64,
    /// Path of the item's picture, relative to the static root.
    pub image_ref: String,
    /// Variant labels; empty when the item has none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl MenuItem {
    /// Create an item without variants.
    #[must_use]
    pub fn new(id: i32, name: &str, unit_price: i64, image_ref: &str) -> Self {
        Self {
            id: MenuItemId::new(id),
            name: name.to_owned(),
            unit_price,
            image_ref: image_ref.to_owned(),
            variants: Vec::new(),
        }
    }

    /// Attach variant labels.
    #[must_use]
    pub fn with_variants(mut self, variants: &[&str]) -> Self {
        self.variants = variants.iter().map(|v| (*v).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Whether `variant` is one of this item's labels (exact match).
    #[must_use]
    pub fn offers_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

/// The static list of items a till can sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    #[must_use]
    pub const fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// The Kedai Hauna house menu.
    #[must_use]
    pub fn kedai_hauna() -> Self {
        Self::new(vec![
            MenuItem::new(1, "Bakso Malang", 23000, "/static/images/Bakso malang.jpg"),
            MenuItem::new(2, "Seblak Special", 16000, "/static/images/Seblak special.jpg"),
            MenuItem::new(3, "Mie Ayam", 18000, "/static/images/Mie Ayam.jpg"),
            MenuItem::new(4, "Siomay", 11000, "/static/images/Siomay.jpg"),
            MenuItem::new(5, "Tea", 6000, "/static/images/Tea.jpg")
                .with_variants(&["Dingin", "Hangat"]),
            MenuItem::new(6, "Ayam Crispy", 17000, "/static/images/Ayam Crispy.jpg"),
            MenuItem::new(7, "Nasi", 5000, "/static/images/Nasi.jpg"),
        ])
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn get(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Items whose name contains `query`, ignoring case.
    ///
    /// A blank query matches every item.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&MenuItem> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::kedai_hauna()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_house_menu_ids_are_unique() {
        let menu = Menu::kedai_hauna();
        let mut ids: Vec<_> = menu.items().iter().map(|item| item.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), menu.items().len());
    }

    #[test]
    fn test_get_known_and_unknown() {
        let menu = Menu::kedai_hauna();
        let bakso = menu.get(MenuItemId::new(1)).unwrap();
        assert_eq!(bakso.name, "Bakso Malang");
        assert_eq!(bakso.unit_price, 23000);
        assert!(menu.get(MenuItemId::new(99)).is_none());
    }

    #[test]
    fn test_tea_has_variants() {
        let menu = Menu::kedai_hauna();
        let tea = menu.get(MenuItemId::new(5)).unwrap();
        assert!(tea.has_variants());
        assert!(tea.offers_variant("Dingin"));
        assert!(!tea.offers_variant("dingin"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let menu = Menu::kedai_hauna();
        let names: Vec<_> = menu.search("AYAM").iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Mie Ayam", "Ayam Crispy"]);
        assert_eq!(menu.search("  ").len(), menu.items().len());
        assert!(menu.search("pizza").is_empty());
    }
}
