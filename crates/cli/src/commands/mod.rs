//! CLI command implementations.
//!
//! # Environment Variables
//!
//! Commands read the same variables as the server (see
//! [`stockroom_server::config`]), most importantly `STOCKROOM_DATA_DIR`.

pub mod accounts;
pub mod history;
pub mod inventory;
pub mod report;
pub mod seed;

use thiserror::Error;

use stockroom_server::config::{ConfigError, ServerConfig};
use stockroom_server::db::{AccountRepository, LocalStorage, RepositoryError};
use stockroom_server::models::CurrentAccount;
use stockroom_server::services::{AccountError, HistoryError, InventoryError};
use stockroom_server::state::{AppState, StartupError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("Startup error: {0}")]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// Open the configured data directory.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the directory cannot
/// be opened.
pub async fn open_state() -> Result<AppState, CommandError> {
    let config = ServerConfig::from_env()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "Opening local storage");
    let storage = LocalStorage::open(&config.data_dir).await?;
    Ok(AppState::new(config, storage))
}

/// The super admin, restored first if it went missing.
///
/// # Errors
///
/// Returns an error if the super admin cannot be restored or read back.
pub async fn acting_super_admin(state: &AppState) -> Result<CurrentAccount, CommandError> {
    state
        .accounts()
        .ensure_super_admin(&state.config().super_admin, state.now())
        .await?;

    AccountRepository::new(state.storage())
        .list_all()
        .await?
        .iter()
        .find(|a| a.is_super)
        .map(CurrentAccount::from)
        .ok_or_else(|| CommandError::Storage(RepositoryError::NotFound))
}
