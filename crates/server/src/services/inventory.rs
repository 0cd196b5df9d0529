//! Inventory listing, editing and change reconciliation.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use stockroom_core::{CurrencyCode, InventoryAction, Permission, StockStatus};

use crate::db::{InventoryRepository, LocalStorage, RepositoryError, TransactionRepository};
use crate::models::{CurrentAccount, Product, Transaction};

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("You do not have permission to edit the inventory")]
    Forbidden,

    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Duplicate product name: {0}")]
    DuplicateName(String),

    #[error("Price cannot be negative for {0}")]
    NegativePrice(String),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Query Types
// =============================================================================

/// Inventory column to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Category,
    #[serde(alias = "name")]
    Type,
    Price,
    Quantity,
    Status,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "type" | "name" => Ok(Self::Type),
            "price" => Ok(Self::Price),
            "quantity" | "qty" => Ok(Self::Quantity),
            "status" => Ok(Self::Status),
            _ => Err(format!("unknown sort key: {s}")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Inventory listing options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryQuery {
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub order: SortOrder,
    /// Case-insensitive substring of the product name.
    pub q: Option<String>,
}

/// Product with its derived stock status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub category: String,
    #[serde(rename = "type")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub qty: u32,
    pub status: StockStatus,
    #[serde(rename = "statusLabel")]
    pub status_label: &'static str,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let status = product.status();
        Self {
            category: product.category.clone(),
            name: product.name.clone(),
            price: product.price,
            qty: product.quantity,
            status,
            status_label: status.label(),
        }
    }
}

/// Product as submitted by an inventory edit.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub category: String,
    #[serde(rename = "type", alias = "name")]
    pub name: String,
    pub price: Decimal,
    #[serde(alias = "quantity")]
    pub qty: u32,
}

/// One detected inventory change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryChange {
    pub action: InventoryAction,
    pub item: String,
    /// New stock level (previous level for deletions).
    pub quantity: u32,
    pub details: String,
}

// =============================================================================
// Pure Functions
// =============================================================================

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort products in place. Sorting is stable.
///
/// Status sorting ignores `order` and always puts out-of-stock first.
pub fn sort_products(products: &mut [Product], key: SortKey, order: SortOrder) {
    if key == SortKey::Status {
        products.sort_by_key(Product::status);
        return;
    }

    products.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Category => compare_text(&a.category, &b.category),
            SortKey::Type => compare_text(&a.name, &b.name),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Quantity => a.quantity.cmp(&b.quantity),
            SortKey::Status => Ordering::Equal,
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Filter products whose name contains `query`, ignoring case.
#[must_use]
pub fn search_products<'p>(products: &'p [Product], query: &str) -> Vec<&'p Product> {
    let needle = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Diff two inventory snapshots by product name.
///
/// Deletions come first (in original order), followed by additions and
/// updates in current order.
#[must_use]
pub fn reconcile(
    original: &[Product],
    current: &[Product],
    currency: CurrencyCode,
) -> Vec<InventoryChange> {
    let mut changes = Vec::new();

    for before in original {
        if !current.iter().any(|p| p.name == before.name) {
            changes.push(InventoryChange {
                action: InventoryAction::Deleted,
                item: before.name.clone(),
                quantity: before.quantity,
                details: format!(
                    "{} deleted from inventory (was: {}, {}, Qty: {})",
                    before.name,
                    before.category,
                    before.unit_price(currency),
                    before.quantity
                ),
            });
        }
    }

    for after in current {
        let Some(before) = original.iter().find(|p| p.name == after.name) else {
            changes.push(InventoryChange {
                action: InventoryAction::Added,
                item: after.name.clone(),
                quantity: after.quantity,
                details: format!(
                    "{} added (Category: {}, {}, Qty: {})",
                    after.name,
                    after.category,
                    after.unit_price(currency),
                    after.quantity
                ),
            });
            continue;
        };

        let mut parts = Vec::new();
        if before.quantity != after.quantity {
            parts.push(format!("Qty {}→{}", before.quantity, after.quantity));
        }
        if before.price != after.price {
            parts.push(format!(
                "Price {}→{}",
                before.unit_price(currency),
                after.unit_price(currency)
            ));
        }
        if before.category != after.category {
            parts.push(format!("Category {}→{}", before.category, after.category));
        }

        if !parts.is_empty() {
            changes.push(InventoryChange {
                action: InventoryAction::Updated,
                item: after.name.clone(),
                quantity: after.quantity,
                details: format!("{} updated: {}", after.name, parts.join(" ")),
            });
        }
    }

    changes
}

/// Trim and check submitted rows.
///
/// # Errors
///
/// Returns a validation error for blank or duplicate names and negative prices.
pub fn validate(input: Vec<ProductInput>) -> Result<Vec<Product>, InventoryError> {
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(input.len());

    for row in input {
        let name = row.name.trim().to_owned();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(InventoryError::DuplicateName(name));
        }
        if row.price.is_sign_negative() && !row.price.is_zero() {
            return Err(InventoryError::NegativePrice(name));
        }
        products.push(Product::new(row.category.trim(), name, row.price, row.qty));
    }

    Ok(products)
}

// =============================================================================
// Service
// =============================================================================

/// Inventory service.
pub struct InventoryService<'a> {
    storage: &'a LocalStorage,
    inventory: InventoryRepository<'a>,
    transactions: TransactionRepository<'a>,
    currency: CurrencyCode,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage, currency: CurrencyCode) -> Self {
        Self {
            storage,
            inventory: InventoryRepository::new(storage),
            transactions: TransactionRepository::new(storage),
            currency,
        }
    }

    /// List products, optionally filtered and sorted.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the catalog cannot be read.
    pub async fn list(&self, query: &InventoryQuery) -> Result<Vec<ProductView>, InventoryError> {
        let mut products = self.inventory.list_all().await?;

        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let needle = q.trim().to_lowercase();
            products.retain(|p| p.name.to_lowercase().contains(&needle));
        }
        if let Some(key) = query.sort {
            sort_products(&mut products, key, query.order);
        }

        Ok(products.iter().map(ProductView::from).collect())
    }

    /// Out-of-stock products followed by low-stock products.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the catalog cannot be read.
    pub async fn stock_alerts(&self) -> Result<Vec<ProductView>, InventoryError> {
        let products = self.inventory.list_all().await?;

        let out = products
            .iter()
            .filter(|p| p.status() == StockStatus::OutOfStock);
        let low = products
            .iter()
            .filter(|p| p.status() == StockStatus::LowStock);

        Ok(out.chain(low).map(ProductView::from).collect())
    }

    /// Replace the inventory and log one entry per detected change.
    ///
    /// The inventory is written before the log.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Forbidden` without `edit_inventory`, or a
    /// validation error for blank/duplicate names or negative prices.
    #[instrument(skip(self, input, editor), fields(editor = %editor.username, products = input.len()))]
    pub async fn save(
        &self,
        input: Vec<ProductInput>,
        editor: &CurrentAccount,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<InventoryChange>, InventoryError> {
        if !editor.has_permission(Permission::EditInventory) {
            return Err(InventoryError::Forbidden);
        }

        let current = validate(input)?;

        let _guard = self.storage.write_lock().await;

        let original = self.inventory.list_all().await?;
        let changes = reconcile(&original, &current, self.currency);

        self.inventory.save_all(&current).await?;

        let entries: Vec<Transaction> = changes
            .iter()
            .map(|change| {
                Transaction::inventory_change(
                    now,
                    change.action,
                    change.item.clone(),
                    change.quantity,
                    change.details.clone(),
                    editor.username.clone(),
                )
            })
            .collect();
        self.transactions.append_many(entries).await?;

        tracing::info!(changes = changes.len(), "Inventory saved");
        Ok(changes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use crate::models::product::default_catalog;
    use stockroom_core::{AccountId, Role};

    fn product(category: &str, name: &str, price: i64, qty: u32) -> Product {
        Product::new(category, name, Decimal::from(price), qty)
    }

    fn input(category: &str, name: &str, price: i64, qty: u32) -> ProductInput {
        ProductInput {
            category: category.to_string(),
            name: name.to_string(),
            price: Decimal::from(price),
            qty,
        }
    }

    fn account(role: Role) -> CurrentAccount {
        CurrentAccount {
            id: AccountId::new("user_1_test".to_string()),
            username: "maria".to_string(),
            role,
            is_super: false,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-11-14T09:00:00+08:00").unwrap()
    }

    #[test]
    fn test_reconcile_details() {
        let original = vec![
            product("Tops", "T-shirts", 120, 25),
            product("Outerwear", "Coats", 300, 0),
            product("Bottoms", "Jeans", 200, 28),
        ];
        let current = vec![
            product("Tops", "T-shirts", 120, 25),
            product("Denim", "Jeans", 210, 20),
            product("Accessories", "Caps", 80, 10),
        ];

        let changes = reconcile(&original, &current, CurrencyCode::PHP);
        let details: Vec<&str> = changes.iter().map(|c| c.details.as_str()).collect();
        assert_eq!(
            details,
            [
                "Coats deleted from inventory (was: Outerwear, ₱300, Qty: 0)",
                "Jeans updated: Qty 28→20 Price ₱200→₱210 Category Bottoms→Denim",
                "Caps added (Category: Accessories, ₱80, Qty: 10)",
            ]
        );
        assert_eq!(changes.get(1).map(|c| c.quantity), Some(20));
    }

    #[test]
    fn test_reconcile_only_changed_parts() {
        let original = vec![product("Tops", "T-shirts", 120, 25)];
        let current = vec![product("Tops", "T-shirts", 120, 24)];

        let changes = reconcile(&original, &current, CurrencyCode::PHP);
        assert_eq!(
            changes.first().map(|c| c.details.as_str()),
            Some("T-shirts updated: Qty 25→24")
        );
        assert!(reconcile(&current, &current, CurrencyCode::PHP).is_empty());
    }

    #[test]
    fn test_sort_by_status_ignores_order() {
        let mut products = default_catalog();
        sort_products(&mut products, SortKey::Status, SortOrder::Desc);

        let statuses: Vec<StockStatus> = products.iter().map(Product::status).collect();
        assert!(statuses.windows(2).all(|w| w.first() <= w.get(1)));
        assert_eq!(products.first().map(|p| p.name.as_str()), Some("Coats"));
    }

    #[test]
    fn test_sort_by_price_desc() {
        let mut products = default_catalog();
        sort_products(&mut products, SortKey::Price, SortOrder::Desc);
        assert_eq!(products.first().map(|p| p.name.as_str()), Some("Coats"));
        assert_eq!(products.last().map(|p| p.name.as_str()), Some("Shorts"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = default_catalog();
        let found: Vec<&str> = search_products(&catalog, "SHIRT")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(found, ["T-shirts", "Polo-shirts"]);
    }

    #[tokio::test]
    async fn test_stock_alerts_out_first() {
        let storage = LocalStorage::in_memory();
        InventoryRepository::new(&storage)
            .initialize(&default_catalog())
            .await
            .unwrap();

        let alerts = InventoryService::new(&storage, CurrencyCode::PHP)
            .stock_alerts()
            .await
            .unwrap();
        let names: Vec<&str> = alerts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Coats", "Boots", "Shorts", "Slacks"]);
    }

    #[tokio::test]
    async fn test_save_logs_changes_after_saving() {
        let storage = LocalStorage::in_memory();
        let service = InventoryService::new(&storage, CurrencyCode::PHP);

        let changes = service
            .save(
                vec![input("Tops", "Caps", 80, 10), input("Tops", "Visors", 60, 3)],
                &account(Role::Admin),
                now(),
            )
            .await
            .unwrap();
        assert_eq!(changes.len(), 2);

        let stored = InventoryRepository::new(&storage).list_all().await.unwrap();
        assert_eq!(stored.len(), 2);

        let log = TransactionRepository::new(&storage).list_all().await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|t| {
            t.kind == TransactionKind::Inventory(InventoryAction::Added)
                && t.total.is_zero()
                && t.user == "maria"
        }));
    }

    #[tokio::test]
    async fn test_save_requires_permission() {
        let storage = LocalStorage::in_memory();
        let service = InventoryService::new(&storage, CurrencyCode::PHP);

        let result = service
            .save(vec![input("Tops", "Caps", 80, 10)], &account(Role::Staff), now())
            .await;
        assert!(matches!(result, Err(InventoryError::Forbidden)));
    }

    #[tokio::test]
    async fn test_save_validation() {
        let storage = LocalStorage::in_memory();
        let service = InventoryService::new(&storage, CurrencyCode::PHP);
        let admin = account(Role::Admin);

        let result = service
            .save(
                vec![input("Tops", "Caps", 80, 1), input("Tops", "caps", 80, 1)],
                &admin,
                now(),
            )
            .await;
        assert!(matches!(result, Err(InventoryError::DuplicateName(_))));

        let result = service
            .save(vec![input("Tops", "  ", 80, 1)], &admin, now())
            .await;
        assert!(matches!(result, Err(InventoryError::EmptyName)));

        let result = service
            .save(vec![input("Tops", "Caps", -5, 1)], &admin, now())
            .await;
        assert!(matches!(result, Err(InventoryError::NegativePrice(_))));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let storage = LocalStorage::in_memory();
        InventoryRepository::new(&storage)
            .initialize(&default_catalog())
            .await
            .unwrap();
        let service = InventoryService::new(&storage, CurrencyCode::PHP);

        let query = InventoryQuery {
            sort: Some(SortKey::Quantity),
            order: SortOrder::Asc,
            q: Some("s".to_string()),
        };
        let listed = service.list(&query).await.unwrap();
        assert_eq!(listed.first().map(|p| p.name.as_str()), Some("Coats"));
        assert!(listed.iter().all(|p| p.name.to_lowercase().contains('s')));
    }
}
