//! Inventory repository over the `inventory_data` blob.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LocalStorage, RepositoryError, keys};
use crate::models::Product;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Stored product record.
#[derive(Debug, Serialize, Deserialize)]
struct ProductRow {
    category: String,
    #[serde(rename = "type")]
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    qty: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.qty).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid quantity {} for {}",
                row.qty, row.name
            ))
        })?;

        if row.price.is_sign_negative() {
            return Err(RepositoryError::DataCorruption(format!(
                "negative price for {}",
                row.name
            )));
        }

        Ok(Self {
            category: row.category,
            name: row.name,
            price: row.price,
            quantity,
        })
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            category: product.category.clone(),
            name: product.name.clone(),
            price: product.price,
            qty: i64::from(product.quantity),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the product catalog.
pub struct InventoryRepository<'a> {
    storage: &'a LocalStorage,
}

impl<'a> InventoryRepository<'a> {
    /// Create a new inventory repository.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage) -> Self {
        Self { storage }
    }

    /// Load the stored catalog, or `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid.
    pub async fn load(&self) -> Result<Option<Vec<Product>>, RepositoryError> {
        let Some(rows) = self
            .storage
            .read_json::<Vec<ProductRow>>(keys::INVENTORY)
            .await?
        else {
            return Ok(None);
        };

        rows.into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// List all products in stored order (empty if never written).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.load().await?.unwrap_or_default())
    }

    /// Find a product by case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|p| p.name_matches(name)))
    }

    /// Seed the catalog if the key is absent.
    ///
    /// Returns `true` if the catalog was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or written.
    pub async fn initialize(&self, catalog: &[Product]) -> Result<bool, RepositoryError> {
        if self.storage.get_item(keys::INVENTORY).await?.is_some() {
            return Ok(false);
        }

        self.save_all(catalog).await?;
        tracing::info!(products = catalog.len(), "Seeded inventory catalog");
        Ok(true)
    }

    /// Overwrite the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be written.
    pub async fn save_all(&self, products: &[Product]) -> Result<(), RepositoryError> {
        let rows: Vec<ProductRow> = products.iter().map(ProductRow::from).collect();
        self.storage.write_json(keys::INVENTORY, &rows).await
    }
}
