//! Product domain type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{CurrencyCode, Price, StockStatus};

/// A product in the inventory.
///
/// Names are unique within the inventory and are the match key for sales,
/// inventory diffs and cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Category (e.g., "Tops", "Footwear").
    pub category: String,
    /// Product name/type (e.g., "Jeans").
    pub name: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Units in stock.
    pub quantity: u32,
}

impl Product {
    /// Create a new product.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Stock status derived from the quantity.
    #[must_use]
    pub const fn status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }

    /// Unit price with currency.
    #[must_use]
    pub const fn unit_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.price, currency)
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// The built-in clothing catalog used to seed an empty inventory.
#[must_use]
pub fn default_catalog() -> Vec<Product> {
    [
        ("Tops", "T-shirts", 120, 25),
        ("Tops", "Polo-shirts", 150, 18),
        ("Tops", "Long sleeves", 180, 22),
        ("Bottoms", "Shorts", 100, 12),
        ("Bottoms", "Baggy Pants", 130, 20),
        ("Bottoms", "Jeans", 200, 28),
        ("Bottoms", "Skirts", 150, 16),
        ("Bottoms", "Slacks", 180, 9),
        ("Outerwear", "Jackets", 250, 21),
        ("Outerwear", "Hoodies", 200, 15),
        ("Outerwear", "Coats", 300, 0),
        ("Outerwear", "Cardigans", 180, 23),
        ("Footwear", "Sneakers", 220, 17),
        ("Footwear", "Sandals", 120, 30),
        ("Footwear", "Boots", 250, 0),
        ("Footwear", "Heels", 200, 19),
    ]
    .into_iter()
    .map(|(category, name, price, quantity)| {
        Product::new(category, name, Decimal::from(price), quantity)
    })
    .collect()
}
