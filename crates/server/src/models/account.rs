//! Account domain types.

use argon2::{
    Argon2,
    password_hash::{self, PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::{AccountId, AccountStatus, Role, Username};

/// A store account (domain type).
///
/// The password hash never leaves the service layer; handlers expose
/// [`AccountView`] instead.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID (`user_<millis>_<random>`).
    pub id: AccountId,
    /// Login name, unique across all accounts.
    pub username: Username,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Role/permission level.
    pub role: Role,
    /// Whether the account may log in yet.
    pub status: AccountStatus,
    /// Username of the creator, or `System`.
    pub created_by: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When a pending account was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Marks the bootstrap super admin.
    pub is_super: bool,
}

impl Account {
    /// Whether the account can log in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Hash a password into an Argon2id PHC string with a fresh salt.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Account as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: AccountId,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub is_super: bool,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.to_string(),
            role: account.role,
            status: account.status,
            created_by: account.created_by.clone(),
            created_at: account.created_at,
            approved_at: account.approved_at,
            is_super: account.is_super,
        }
    }
}
