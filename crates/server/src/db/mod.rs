//! Durable key-value storage for Stockroom.
//!
//! # Keys
//!
//! Each collection is stored as a single JSON blob:
//!
//! - `userAccounts` - Account records (including the bootstrap super admin)
//! - `inventory_data` - Product catalog with stock levels
//! - `transactions` - Sales, inventory changes and login activity, newest first
//! - `recent_searches` - Up to 5 POS search terms, newest first
//!
//! Every write is a read-modify-write of the whole blob. Callers that read and
//! then write must hold [`LocalStorage::write_lock`] for the whole sequence.

pub mod accounts;
pub mod inventory;
pub mod local_storage;
pub mod searches;
pub mod transactions;

use thiserror::Error;

pub use accounts::AccountRepository;
pub use inventory::InventoryRepository;
pub use local_storage::{LocalStorage, WriteGuard};
pub use searches::SearchRepository;
pub use transactions::TransactionRepository;

/// Storage key names.
pub mod keys {
    /// Account records.
    pub const ACCOUNTS: &str = "userAccounts";
    /// Product catalog.
    pub const INVENTORY: &str = "inventory_data";
    /// Transaction log.
    pub const TRANSACTIONS: &str = "transactions";
    /// Recent POS searches.
    pub const RECENT_SEARCHES: &str = "recent_searches";
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Filesystem error from the directory backend.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Stored data is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}
