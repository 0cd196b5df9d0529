//! Session-related types for account authentication.

use serde::{Deserialize, Serialize};

use stockroom_core::{AccountId, Permission, Role};

use super::Account;

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAccount {
    /// Account ID.
    pub id: AccountId,
    /// Login name.
    pub username: String,
    /// Role/permission level.
    pub role: Role,
    /// Whether this is the bootstrap super admin.
    pub is_super: bool,
}

impl CurrentAccount {
    /// Whether the account holds a permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_super || self.role.has_permission(permission)
    }

    /// Whether the account is the super admin.
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        self.is_super
    }
}

impl From<&Account> for CurrentAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.to_string(),
            role: account.role,
            is_super: account.is_super,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in account.
    pub const CURRENT_ACCOUNT: &str = "current_account";

    /// Key for the POS cart.
    pub const CART: &str = "cart";
}
