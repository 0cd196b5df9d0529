//! Point-of-sale cart handling and checkout.
//!
//! The cart itself lives in the visitor's session; this service validates
//! cart changes against the current inventory and turns a cart into stock
//! deductions, sale log entries and a [`Receipt`].

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use stockroom_core::{CurrencyCode, Permission, ReceiptId};

use crate::db::{
    InventoryRepository, LocalStorage, RepositoryError, SearchRepository, TransactionRepository,
};
use crate::models::{Cart, CurrentAccount, Receipt, Transaction};
use crate::services::inventory::{ProductView, search_products};

/// Rows shown in the POS transaction table.
pub const RECENT_TRANSACTIONS_LIMIT: usize = 20;

/// Receipt date format (e.g., "November 14, 2025").
const RECEIPT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Receipt time format (e.g., "03:25 PM").
const RECEIPT_TIME_FORMAT: &str = "%I:%M %p";

/// Errors that can occur at the point of sale.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please enter a valid quantity!")]
    InvalidQuantity,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Only {available} items available!")]
    InsufficientStock { available: u32 },

    #[error("Item not in cart: {0}")]
    NotInCart(String),

    #[error("Your cart is empty!")]
    EmptyCart,

    #[error("Failed to deduct {0}. Insufficient stock!")]
    DeductionFailed(String),

    #[error("You do not have permission to record sales")]
    Forbidden,

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A sale row in the POS transaction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub date: String,
    pub item: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub time: String,
    pub user: String,
}

impl From<&Transaction> for RecentTransaction {
    fn from(sale: &Transaction) -> Self {
        Self {
            date: sale.date_label(),
            item: sale.item.clone(),
            quantity: sale.quantity,
            total: sale.total,
            time: sale.time_label(),
            user: sale.user.clone(),
        }
    }
}

/// Point-of-sale service.
pub struct CheckoutService<'a> {
    storage: &'a LocalStorage,
    inventory: InventoryRepository<'a>,
    transactions: TransactionRepository<'a>,
    searches: SearchRepository<'a>,
    currency: CurrencyCode,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage, currency: CurrencyCode) -> Self {
        Self {
            storage,
            inventory: InventoryRepository::new(storage),
            transactions: TransactionRepository::new(storage),
            searches: SearchRepository::new(storage),
            currency,
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add units of a product to the cart.
    ///
    /// The product is looked up by name ignoring case, and the cart line is
    /// keyed by the catalog name. The merged quantity may not exceed stock.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidQuantity` for a zero quantity,
    /// `CheckoutError::ProductNotFound` for an unknown product and
    /// `CheckoutError::InsufficientStock` when stock would be exceeded.
    pub async fn add_to_cart(
        &self,
        cart: &mut Cart,
        item: &str,
        quantity: u32,
    ) -> Result<(), CheckoutError> {
        if quantity < 1 {
            return Err(CheckoutError::InvalidQuantity);
        }

        let product = self
            .inventory
            .find_by_name(item)
            .await?
            .ok_or_else(|| CheckoutError::ProductNotFound(item.trim().to_owned()))?;

        let available = product.quantity;
        let merged = cart
            .quantity_of(&product.name)
            .checked_add(quantity)
            .ok_or(CheckoutError::InsufficientStock { available })?;
        if merged > available {
            return Err(CheckoutError::InsufficientStock { available });
        }

        cart.add(&product.name, product.price, quantity);
        Ok(())
    }

    /// Remove an item's line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotInCart` if the item has no line.
    pub fn remove_from_cart(cart: &mut Cart, item: &str) -> Result<(), CheckoutError> {
        if cart.remove(item) {
            Ok(())
        } else {
            Err(CheckoutError::NotInCart(item.to_owned()))
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Deduct stock for every cart line and record one sale per line.
    ///
    /// Every line is checked before anything is written, so a short line
    /// leaves both the inventory and the log untouched. The caller clears the
    /// cart once the receipt is returned.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart and
    /// `CheckoutError::DeductionFailed` naming the first line that cannot be
    /// filled.
    #[instrument(skip(self, cart, cashier), fields(cashier = %cashier.username, lines = cart.lines.len()))]
    pub async fn checkout(
        &self,
        cart: &Cart,
        cashier: &CurrentAccount,
        now: DateTime<FixedOffset>,
    ) -> Result<Receipt, CheckoutError> {
        if !cashier.has_permission(Permission::ViewTransaction) {
            return Err(CheckoutError::Forbidden);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let _guard = self.storage.write_lock().await;

        let mut products = self.inventory.list_all().await?;
        for line in &cart.lines {
            let product = products
                .iter_mut()
                .find(|p| p.name_matches(&line.item))
                .filter(|p| p.quantity >= line.quantity)
                .ok_or_else(|| CheckoutError::DeductionFailed(line.item.clone()))?;
            product.quantity -= line.quantity;
        }

        self.inventory.save_all(&products).await?;

        let sales: Vec<Transaction> = cart
            .lines
            .iter()
            .map(|line| {
                Transaction::sale(
                    now,
                    line.item.clone(),
                    line.quantity,
                    line.line_total,
                    cashier.username.clone(),
                )
            })
            .collect();
        self.transactions.append_many(sales).await?;

        let total = cart.total();
        let receipt = Receipt {
            id: ReceiptId::generate(),
            date: now.format(RECEIPT_DATE_FORMAT).to_string(),
            time: now.format(RECEIPT_TIME_FORMAT).to_string(),
            cashier: cashier.username.clone(),
            lines: cart.lines.clone(),
            subtotal: total,
            total,
            currency: self.currency,
        };

        tracing::info!(receipt_id = %receipt.id, total = %total, "Checkout completed");
        Ok(receipt)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Products whose name contains `query`, ignoring case.
    ///
    /// A blank query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the catalog cannot be read.
    pub async fn search(&self, query: &str) -> Result<Vec<ProductView>, CheckoutError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let products = self.inventory.list_all().await?;
        Ok(search_products(&products, query)
            .into_iter()
            .map(ProductView::from)
            .collect())
    }

    /// Remember a search term and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the list cannot be written.
    pub async fn record_search(&self, term: &str) -> Result<Vec<String>, CheckoutError> {
        let _guard = self.storage.write_lock().await;
        Ok(self.searches.record(term).await?)
    }

    /// Recent search terms, newest first.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the list cannot be read.
    pub async fn recent_searches(&self) -> Result<Vec<String>, CheckoutError> {
        Ok(self.searches.list().await?)
    }

    /// The latest [`RECENT_TRANSACTIONS_LIMIT`] sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log cannot be read.
    pub async fn recent_transactions(&self) -> Result<Vec<RecentTransaction>, CheckoutError> {
        let mut sales: Vec<Transaction> = self
            .transactions
            .list_all()
            .await?
            .into_iter()
            .filter(Transaction::is_sale)
            .collect();
        sales.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sales.truncate(RECENT_TRANSACTIONS_LIMIT);

        Ok(sales.iter().map(RecentTransaction::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::product::default_catalog;
    use stockroom_core::{AccountId, Role};

    fn cashier() -> CurrentAccount {
        CurrentAccount {
            id: AccountId::new("user_1_test".to_string()),
            username: "maria".to_string(),
            role: Role::Staff,
            is_super: false,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-11-14T15:25:00+08:00").unwrap()
    }

    async fn seeded() -> LocalStorage {
        let storage = LocalStorage::in_memory();
        InventoryRepository::new(&storage)
            .initialize(&default_catalog())
            .await
            .unwrap();
        storage
    }

    async fn stock_of(storage: &LocalStorage, name: &str) -> u32 {
        InventoryRepository::new(storage)
            .find_by_name(name)
            .await
            .unwrap()
            .map_or(0, |p| p.quantity)
    }

    #[tokio::test]
    async fn test_add_validates_quantity_and_stock() {
        let storage = seeded().await;
        let service = CheckoutService::new(&storage, CurrencyCode::PHP);
        let mut cart = Cart::default();

        let result = service.add_to_cart(&mut cart, "Jeans", 0).await;
        assert!(matches!(result, Err(CheckoutError::InvalidQuantity)));

        let result = service.add_to_cart(&mut cart, "Slacks", 10).await;
        assert_eq!(result.unwrap_err().to_string(), "Only 9 items available!");

        service.add_to_cart(&mut cart, "slacks", 5).await.unwrap();
        let result = service.add_to_cart(&mut cart, "Slacks", 5).await;
        assert!(matches!(
            result,
            Err(CheckoutError::InsufficientStock { available: 9 })
        ));
        assert_eq!(cart.quantity_of("Slacks"), 5);

        let result = service.add_to_cart(&mut cart, "Capes", 1).await;
        assert!(matches!(result, Err(CheckoutError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_checkout_deducts_logs_and_builds_receipt() {
        let storage = seeded().await;
        let service = CheckoutService::new(&storage, CurrencyCode::PHP);
        let mut cart = Cart::default();
        service.add_to_cart(&mut cart, "Jeans", 2).await.unwrap();
        service.add_to_cart(&mut cart, "Sandals", 1).await.unwrap();

        let receipt = service.checkout(&cart, &cashier(), now()).await.unwrap();
        assert_eq!(receipt.total, Decimal::from(520));
        assert_eq!(receipt.date, "November 14, 2025");
        assert_eq!(receipt.time, "03:25 PM");
        assert_eq!(receipt.cashier, "maria");

        assert_eq!(stock_of(&storage, "Jeans").await, 26);
        assert_eq!(stock_of(&storage, "Sandals").await, 29);

        let log = TransactionRepository::new(&storage).list_all().await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|t| t.is_sale() && t.user == "maria"));
    }

    #[tokio::test]
    async fn test_checkout_is_all_or_nothing() {
        let storage = seeded().await;
        let service = CheckoutService::new(&storage, CurrencyCode::PHP);
        let mut cart = Cart::default();
        cart.add("Jeans", Decimal::from(200), 1);
        cart.add("Coats", Decimal::from(300), 1);

        let result = service.checkout(&cart, &cashier(), now()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to deduct Coats. Insufficient stock!"
        );
        assert_eq!(stock_of(&storage, "Jeans").await, 28);
        assert!(
            TransactionRepository::new(&storage)
                .list_all()
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let storage = seeded().await;
        let service = CheckoutService::new(&storage, CurrencyCode::PHP);

        let result = service.checkout(&Cart::default(), &cashier(), now()).await;
        assert_eq!(result.unwrap_err().to_string(), "Your cart is empty!");
    }

    #[tokio::test]
    async fn test_recent_transactions_only_sales_newest_first() {
        let storage = seeded().await;
        let service = CheckoutService::new(&storage, CurrencyCode::PHP);
        let repo = TransactionRepository::new(&storage);

        for minute in 0..25u32 {
            let at = now() + chrono::Duration::minutes(i64::from(minute));
            repo.append(Transaction::sale(at, "Jeans", 1, Decimal::from(200), "maria"))
                .await
                .unwrap();
        }
        repo.append(Transaction::sale(now(), "Freebie", 1, Decimal::ZERO, "maria"))
            .await
            .unwrap();

        let recent = service.recent_transactions().await.unwrap();
        assert_eq!(recent.len(), RECENT_TRANSACTIONS_LIMIT);
        assert!(recent.iter().all(|t| t.item == "Jeans"));
        assert_eq!(recent.first().map(|t| t.time.as_str()), Some("03:49 PM"));
    }

    #[tokio::test]
    async fn test_search_and_recents() {
        let storage = seeded().await;
        let service = CheckoutService::new(&storage, CurrencyCode::PHP);

        assert!(service.search("  ").await.unwrap().is_empty());
        let found = service.search("pant").await.unwrap();
        assert_eq!(found.first().map(|p| p.name.as_str()), Some("Baggy Pants"));

        service.record_search("Baggy Pants").await.unwrap();
        assert_eq!(service.recent_searches().await.unwrap(), ["Baggy Pants"]);
    }
}
