//! Account management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use stockroom_core::AccountId;

use crate::error::Result;
use crate::middleware::auth::CreateAccount;
use crate::middleware::{RequireAuth, RequirePermission, RequireSuperAdmin};
use crate::services::accounts::{AccountListing, CreatedAccount, NewAccount};
use crate::state::AppState;

/// Active accounts, plus pending ones for the super admin.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(viewer): RequireAuth,
) -> Result<Json<AccountListing>> {
    Ok(Json(state.accounts().list_accounts(&viewer).await?))
}

/// Create an account.
///
/// Accounts created by anyone but the super admin await approval.
pub async fn create(
    State(state): State<AppState>,
    RequirePermission(creator, _): RequirePermission<CreateAccount>,
    Json(form): Json<NewAccount>,
) -> Result<(StatusCode, Json<CreatedAccount>)> {
    let created = state
        .accounts()
        .create_account(&form, Some(&creator), state.now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Approve a pending account.
pub async fn approve(
    State(state): State<AppState>,
    RequireSuperAdmin(approver): RequireSuperAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let account = state
        .accounts()
        .approve_account(&AccountId::new(id), &approver, state.now())
        .await?;
    Ok(Json(json!({
        "message": "Account approved successfully",
        "account": account,
    })))
}

/// Delete an active account or reject a pending one.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state
        .accounts()
        .delete_account(&AccountId::new(id), &actor)
        .await?;
    Ok(Json(json!({ "message": "Account deleted successfully" })))
}
