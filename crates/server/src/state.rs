//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use stockroom_core::CurrencyCode;

use crate::config::ServerConfig;
use crate::db::{InventoryRepository, LocalStorage, RepositoryError};
use crate::models::product::default_catalog;
use crate::services::{
    AccountError, AccountService, CheckoutService, DashboardService, HistoryService,
    InventoryService,
};

/// Error preparing the store at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
    #[error("super admin setup failed: {0}")]
    SuperAdmin(#[from] AccountError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the local storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    storage: LocalStorage,
}

impl AppState {
    /// Create a new application state over an opened store.
    #[must_use]
    pub fn new(config: ServerConfig, storage: LocalStorage) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, storage }),
        }
    }

    /// Seed the default catalog into an empty store, hash any legacy
    /// plaintext passwords and restore the super admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub async fn prepare(&self) -> Result<(), StartupError> {
        let seeded = {
            let _guard = self.storage().write_lock().await;
            InventoryRepository::new(self.storage())
                .initialize(&default_catalog())
                .await?
        };
        if seeded {
            tracing::info!("Seeded default catalog");
        }

        self.accounts().upgrade_legacy_passwords().await?;

        let restored = self
            .accounts()
            .ensure_super_admin(&self.config().super_admin, self.now())
            .await?;
        if let Some(account) = restored {
            tracing::info!(username = %account.username, "Super admin restored");
        }
        Ok(())
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the local storage.
    #[must_use]
    pub fn storage(&self) -> &LocalStorage {
        &self.inner.storage
    }

    /// Display currency.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.config.currency
    }

    /// Current time in the store's offset.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.inner.config.utc_offset)
    }

    /// Account service over the shared store.
    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self.storage())
    }

    /// Inventory service over the shared store.
    #[must_use]
    pub fn inventory(&self) -> InventoryService<'_> {
        InventoryService::new(self.storage(), self.currency())
    }

    /// Dashboard service over the shared store.
    #[must_use]
    pub fn dashboard(&self) -> DashboardService<'_> {
        DashboardService::new(self.storage(), self.currency())
    }

    /// Checkout service over the shared store.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(self.storage(), self.currency())
    }

    /// History service over the shared store.
    #[must_use]
    pub fn history(&self) -> HistoryService<'_> {
        HistoryService::new(self.storage(), self.currency())
    }
}
