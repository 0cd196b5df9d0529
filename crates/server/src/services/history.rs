//! Activity history over the transaction log.

use serde::Serialize;
use tracing::instrument;

use stockroom_core::{CurrencyCode, Permission, Price};

use crate::db::{LocalStorage, RepositoryError, TransactionRepository};
use crate::models::{CurrentAccount, Transaction, TransactionKind};

/// History timestamp format (e.g., "Nov 14 2025 – 03:25 PM").
const HISTORY_TIMESTAMP_FORMAT: &str = "%b %-d %Y – %I:%M %p";

/// Errors that can occur while reading or clearing history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("You do not have permission to view the history")]
    Forbidden,

    #[error("Only the Super Admin can clear the history")]
    SuperAdminOnly,

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One row of the history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub user: String,
    pub action: &'static str,
    pub details: String,
}

/// Render a log entry for the history page.
#[must_use]
pub fn history_entry(transaction: &Transaction, currency: CurrencyCode) -> HistoryEntry {
    let action = match transaction.kind {
        TransactionKind::Sale => "Sale completed",
        TransactionKind::Inventory(action) => action.label(),
        TransactionKind::Activity(activity) => activity.as_str(),
    };
    let details = transaction.details.clone().unwrap_or_else(|| {
        format!(
            "{}, Quantity: {}, Total: {}",
            transaction.item,
            transaction.quantity,
            Price::new(transaction.total, currency)
        )
    });

    HistoryEntry {
        timestamp: transaction
            .timestamp
            .format(HISTORY_TIMESTAMP_FORMAT)
            .to_string(),
        user: transaction.user.clone(),
        action,
        details,
    }
}

/// History service.
pub struct HistoryService<'a> {
    storage: &'a LocalStorage,
    transactions: TransactionRepository<'a>,
    currency: CurrencyCode,
}

impl<'a> HistoryService<'a> {
    /// Create a new history service.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage, currency: CurrencyCode) -> Self {
        Self {
            storage,
            transactions: TransactionRepository::new(storage),
            currency,
        }
    }

    /// Every log entry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Forbidden` without `view_history`.
    pub async fn entries(&self, viewer: &CurrentAccount) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !viewer.has_permission(Permission::ViewHistory) {
            return Err(HistoryError::Forbidden);
        }

        let mut log = self.transactions.list_all().await?;
        log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(log
            .iter()
            .map(|t| history_entry(t, self.currency))
            .collect())
    }

    /// Remove the whole transaction log.
    ///
    /// Waits for the store-wide write lock so an in-flight append cannot
    /// write the old log back.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::SuperAdminOnly` unless `actor` is the super admin.
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn clear(&self, actor: &CurrentAccount) -> Result<(), HistoryError> {
        if !actor.is_super_admin() {
            return Err(HistoryError::SuperAdminOnly);
        }

        let _guard = self.storage.write_lock().await;
        self.transactions.clear().await?;
        tracing::warn!("Transaction history cleared");
        Ok(())
    }
}
