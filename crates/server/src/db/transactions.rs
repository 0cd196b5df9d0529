//! Transaction log repository over the `transactions` blob.
//!
//! The log is kept newest first. Entries carry pre-formatted `date` and
//! `time` strings next to the RFC 3339 `timestamp`.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::InventoryAction;

use super::{LocalStorage, RepositoryError, keys};
use crate::models::transaction::SYSTEM_USER;
use crate::models::{Activity, Transaction, TransactionKind};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Stored log entry.
#[derive(Debug, Serialize, Deserialize)]
struct TransactionRow {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    item: String,
    #[serde(default)]
    quantity: i64,
    #[serde(default, with = "rust_decimal::serde::float")]
    total: Decimal,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    time: String,
    timestamp: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

fn parse_kind(action: Option<&str>) -> Result<TransactionKind, RepositoryError> {
    let Some(action) = action else {
        return Ok(TransactionKind::Sale);
    };

    if action == Activity::LoggedIn.as_str() {
        return Ok(TransactionKind::Activity(Activity::LoggedIn));
    }
    if action == Activity::LoggedOut.as_str() {
        return Ok(TransactionKind::Activity(Activity::LoggedOut));
    }

    action
        .parse::<InventoryAction>()
        .map(TransactionKind::Inventory)
        .map_err(RepositoryError::DataCorruption)
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = parse_kind(row.action.as_deref())?;

        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid quantity {} in transaction at {}",
                row.quantity, row.timestamp
            ))
        })?;

        Ok(Self {
            timestamp: row.timestamp,
            item: row.item,
            quantity,
            total: row.total,
            kind,
            details: row.details,
            user: row.user.unwrap_or_else(|| SYSTEM_USER.to_string()),
        })
    }
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        let action = match tx.kind {
            TransactionKind::Sale => None,
            TransactionKind::Inventory(action) => Some(action.as_str().to_string()),
            TransactionKind::Activity(activity) => Some(activity.as_str().to_string()),
        };
        // Activity entries carry no sale columns.
        let (date, time) = match tx.kind {
            TransactionKind::Activity(_) => (String::new(), String::new()),
            _ => (tx.date_label(), tx.time_label()),
        };

        Self {
            date,
            item: tx.item.clone(),
            quantity: i64::from(tx.quantity),
            total: tx.total,
            time,
            timestamp: tx.timestamp,
            action,
            details: tx.details.clone(),
            user: Some(tx.user.clone()),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the transaction log.
pub struct TransactionRepository<'a> {
    storage: &'a LocalStorage,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage) -> Self {
        Self { storage }
    }

    /// List all entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if an entry is invalid.
    pub async fn list_all(&self) -> Result<Vec<Transaction>, RepositoryError> {
        let rows: Vec<TransactionRow> = self
            .storage
            .read_json(keys::TRANSACTIONS)
            .await?
            .unwrap_or_default();

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Put one entry at the front of the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or written.
    pub async fn append(&self, transaction: Transaction) -> Result<(), RepositoryError> {
        self.append_many(vec![transaction]).await
    }

    /// Put entries at the front of the log, one at a time.
    ///
    /// Each entry is pushed to the front in turn, so the last entry of the
    /// batch ends up first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or written.
    pub async fn append_many(&self, batch: Vec<Transaction>) -> Result<(), RepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut rows: Vec<TransactionRow> = self
            .storage
            .read_json(keys::TRANSACTIONS)
            .await?
            .unwrap_or_default();

        let mut fresh: Vec<TransactionRow> = batch.iter().map(TransactionRow::from).collect();
        fresh.reverse();
        fresh.append(&mut rows);

        self.storage.write_json(keys::TRANSACTIONS, &fresh).await
    }

    /// Remove the whole log.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        self.storage.remove_item(keys::TRANSACTIONS).await
    }
}
