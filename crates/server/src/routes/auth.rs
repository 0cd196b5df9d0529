//! Login, logout and current-account handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_account, set_current_account};
use crate::models::CurrentAccount;
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Log in and start a session.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<CurrentAccount>> {
    let account = state
        .accounts()
        .login(&form.username, &form.password, state.now())
        .await?;

    set_current_account(&session, &account).await?;
    set_sentry_user(&account.id, &account.username);

    Ok(Json(account))
}

/// Log out and end the session.
///
/// Logging out without a session is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(account): OptionalAuth,
) -> Result<StatusCode> {
    if let Some(account) = account {
        state.accounts().logout(&account, state.now()).await?;
    }

    clear_current_account(&session).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in account.
pub async fn me(RequireAuth(account): RequireAuth) -> Json<CurrentAccount> {
    Json(account)
}
