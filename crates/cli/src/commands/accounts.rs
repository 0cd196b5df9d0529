//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an active account (no approval needed)
//! sr-cli accounts create -u maria -p secret123 -r staff
//!
//! # Approve or reject accounts created through the API
//! sr-cli accounts list
//! sr-cli accounts approve user_1731568800000_k3j9x2m1q
//! sr-cli accounts delete user_1731568800000_k3j9x2m1q
//! ```

use tracing::info;

use stockroom_core::{AccountId, Role};
use stockroom_server::models::AccountView;
use stockroom_server::services::accounts::NewAccount;

use super::{CommandError, acting_super_admin, open_state};

/// Create an active account on behalf of `System`.
///
/// # Errors
///
/// Returns an error for an invalid role, a failed validation or a taken
/// username.
pub async fn create(username: &str, password: &str, role: &str) -> Result<(), CommandError> {
    let role: Role = role.parse().map_err(CommandError::InvalidArgument)?;

    let state = open_state().await?;
    let form = NewAccount {
        username: username.to_owned(),
        password: password.to_owned(),
        confirm_password: password.to_owned(),
        role,
    };
    let created = state
        .accounts()
        .create_account(&form, None, state.now())
        .await?;

    info!(
        "Account created! ID: {}, Username: {}, Role: {}",
        created.account.id, created.account.username, created.account.role
    );
    Ok(())
}

/// List active and pending accounts.
///
/// # Errors
///
/// Returns an error if the accounts cannot be read.
pub async fn list() -> Result<(), CommandError> {
    let state = open_state().await?;
    let viewer = acting_super_admin(&state).await?;
    let listing = state.accounts().list_accounts(&viewer).await?;

    info!("Active accounts ({})", listing.active.len());
    for account in &listing.active {
        info!("  {}", account_line(account));
    }
    info!("Pending accounts ({})", listing.pending.len());
    for account in &listing.pending {
        info!("  {}", account_line(account));
    }
    Ok(())
}

/// Approve a pending account.
///
/// # Errors
///
/// Returns an error if the account does not exist or is already active.
pub async fn approve(id: &str) -> Result<(), CommandError> {
    let state = open_state().await?;
    let approver = acting_super_admin(&state).await?;
    let account = state
        .accounts()
        .approve_account(&AccountId::new(id.to_owned()), &approver, state.now())
        .await?;

    info!(username = %account.username, "Account approved");
    Ok(())
}

/// Delete an account or reject a pending one.
///
/// # Errors
///
/// Returns an error if the account does not exist or is the super admin.
pub async fn delete(id: &str) -> Result<(), CommandError> {
    let state = open_state().await?;
    let actor = acting_super_admin(&state).await?;
    state
        .accounts()
        .delete_account(&AccountId::new(id.to_owned()), &actor)
        .await?;

    info!(%id, "Account deleted");
    Ok(())
}

fn account_line(account: &AccountView) -> String {
    let marker = if account.is_super { " *" } else { "" };
    format!(
        "{:<32} {:<16} {:<12} created by {}{marker}",
        account.id.to_string(),
        account.username,
        account.role.to_string(),
        account.created_by
    )
}
