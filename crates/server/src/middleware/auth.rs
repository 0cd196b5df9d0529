//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in account, a specific
//! permission, or the super admin in route handlers.

use std::marker::PhantomData;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use stockroom_core::Permission;

use crate::models::{CurrentAccount, session_keys};

/// Error returned when a request lacks the required authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No account is logged in.
    Unauthorized,
    /// The account lacks the required permission.
    Forbidden(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Please log in first"),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn current_account(parts: &Parts) -> Option<CurrentAccount> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
        .await
        .ok()
        .flatten()
}

/// Extractor that requires a logged-in account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(account): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", account.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_account(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

/// Extractor that optionally gets the current account.
///
/// Unlike `RequireAuth`, this does not reject the request if no one is logged in.
pub struct OptionalAuth(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_account(parts).await))
    }
}

/// Extractor that requires the super admin.
pub struct RequireSuperAdmin(pub CurrentAccount);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = current_account(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;

        if !account.is_super_admin() {
            return Err(AuthRejection::Forbidden(
                "Only the Super Admin can access this resource",
            ));
        }

        Ok(Self(account))
    }
}

// =============================================================================
// Permission Gates
// =============================================================================

/// A permission checked by [`RequirePermission`].
pub trait PermissionGate {
    const PERMISSION: Permission;
    const DENIED: &'static str;
}

/// Extractor that requires a logged-in account holding `P::PERMISSION`.
///
/// # Example
///
/// ```rust,ignore
/// async fn edit_handler(
///     RequirePermission(account, _): RequirePermission<EditInventory>,
/// ) -> impl IntoResponse {
///     format!("{} may edit", account.username)
/// }
/// ```
pub struct RequirePermission<P>(pub CurrentAccount, pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for RequirePermission<P>
where
    P: PermissionGate,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = current_account(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;

        if !account.has_permission(P::PERMISSION) {
            tracing::debug!(
                username = %account.username,
                permission = ?P::PERMISSION,
                "Permission denied"
            );
            return Err(AuthRejection::Forbidden(P::DENIED));
        }

        Ok(Self(account, PhantomData))
    }
}

macro_rules! permission_gate {
    ($name:ident, $permission:expr, $denied:literal) => {
        #[doc = concat!("Gate for `", stringify!($permission), "`.")]
        pub struct $name;

        impl PermissionGate for $name {
            const PERMISSION: Permission = $permission;
            const DENIED: &'static str = $denied;
        }
    };
}

permission_gate!(
    ViewInventory,
    Permission::ViewInventory,
    "You do not have permission to view the inventory"
);
permission_gate!(
    EditInventory,
    Permission::EditInventory,
    "You do not have permission to edit the inventory"
);
permission_gate!(
    ViewTransaction,
    Permission::ViewTransaction,
    "You do not have permission to record sales"
);
permission_gate!(
    ViewHistory,
    Permission::ViewHistory,
    "You do not have permission to view the history"
);
permission_gate!(
    CreateAccount,
    Permission::CreateAccount,
    "You do not have permission to manage accounts"
);

// =============================================================================
// Session Helpers
// =============================================================================

/// Helper to set the current account in the session.
///
/// The session ID is cycled first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &CurrentAccount,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ACCOUNT, account).await
}

/// Helper to end the session (logout), dropping the cart with it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_account(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
