//! Account management and password authentication.
//!
//! Exactly one account carries `is_super`. It is created (or restored) by
//! [`AccountService::ensure_super_admin`] and can never be deleted.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{DateTime, FixedOffset, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use stockroom_core::{AccountId, AccountStatus, Permission, Role, Username, UsernameError};

use crate::db::{AccountRepository, LocalStorage, RepositoryError, TransactionRepository};
use crate::models::account;
use crate::models::transaction::SYSTEM_USER;
use crate::models::{Account, AccountView, Activity, CurrentAccount, Transaction};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Cannot create another Super Admin account")]
    SuperAdminRole,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is pending Super Admin approval")]
    PendingApproval,

    #[error("Account not found")]
    NotFound,

    #[error("Account is already active")]
    AlreadyActive,

    #[error("Cannot delete Super Admin account")]
    CannotDeleteSuperAdmin,

    #[error("Operation cancelled: Would remove Super Admin")]
    WouldRemoveSuperAdmin,

    /// Caller lacks the required role or permission.
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}

/// Credentials for the bootstrap super admin.
#[derive(Clone)]
pub struct SuperAdminSeed {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for SuperAdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperAdminSeed")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account creation form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

/// Result of a successful account creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAccount {
    pub account: AccountView,
    pub needs_approval: bool,
    pub message: &'static str,
}

/// Accounts visible to a viewer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountListing {
    pub active: Vec<AccountView>,
    /// Only populated for the super admin.
    pub pending: Vec<AccountView>,
}

/// Account service.
pub struct AccountService<'a> {
    storage: &'a LocalStorage,
    accounts: AccountRepository<'a>,
    transactions: TransactionRepository<'a>,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage) -> Self {
        Self {
            storage,
            accounts: AccountRepository::new(storage),
            transactions: TransactionRepository::new(storage),
        }
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Create the bootstrap super admin if no account is marked super.
    ///
    /// If a regular account already uses the seed username it is promoted
    /// and its password reset to the seed password.
    ///
    /// Returns the account when one was created or restored.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidUsername` if the seed username is
    /// invalid, or a repository error if storage fails.
    #[instrument(skip(self, seed), fields(username = %seed.username))]
    pub async fn ensure_super_admin(
        &self,
        seed: &SuperAdminSeed,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<Account>, AccountError> {
        let _guard = self.storage.write_lock().await;

        let mut accounts = self.accounts.list_all().await?;
        if accounts.iter().any(|a| a.is_super) {
            return Ok(None);
        }

        let username = Username::parse(&seed.username)?;
        let password_hash = hash_password(seed.password.expose_secret())?;

        let restored = if let Some(existing) = accounts.iter_mut().find(|a| a.username == username)
        {
            existing.password_hash = password_hash;
            existing.role = Role::SuperAdmin;
            existing.status = AccountStatus::Active;
            existing.is_super = true;
            existing.clone()
        } else {
            let account = Account {
                id: AccountId::generate(),
                username,
                password_hash,
                role: Role::SuperAdmin,
                status: AccountStatus::Active,
                created_by: SYSTEM_USER.to_string(),
                created_at: now.with_timezone(&Utc),
                approved_at: None,
                is_super: true,
            };
            accounts.push(account.clone());
            account
        };

        self.accounts.save_all(&accounts).await?;
        tracing::warn!("Super Admin account created/restored");
        Ok(Some(restored))
    }

    /// Replace plaintext passwords left in older account blobs with hashes.
    ///
    /// Returns the number of accounts upgraded.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the accounts cannot be read or written.
    pub async fn upgrade_legacy_passwords(&self) -> Result<usize, AccountError> {
        let _guard = self.storage.write_lock().await;
        let upgraded = self.accounts.upgrade_legacy_passwords().await?;
        if upgraded > 0 {
            tracing::warn!(upgraded, "Hashed plaintext passwords from a legacy account blob");
        }
        Ok(upgraded)
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Create a new account.
    ///
    /// `creator` is `None` for accounts created by the system (CLI); those
    /// are active immediately. Accounts created by anyone but the super admin
    /// start out pending.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing fields, mismatched or short
    /// passwords, or the Super Admin role. Returns
    /// `AccountError::UsernameTaken` for a duplicate username and
    /// `AccountError::Forbidden` if the creator lacks `create_account`.
    #[instrument(skip(self, form, creator), fields(username = %form.username, role = %form.role))]
    pub async fn create_account(
        &self,
        form: &NewAccount,
        creator: Option<&CurrentAccount>,
        now: DateTime<FixedOffset>,
    ) -> Result<CreatedAccount, AccountError> {
        if creator.is_some_and(|c| !c.has_permission(Permission::CreateAccount)) {
            return Err(AccountError::Forbidden(
                "You do not have permission to create accounts",
            ));
        }

        if form.username.trim().is_empty()
            || form.password.is_empty()
            || form.confirm_password.is_empty()
        {
            return Err(AccountError::MissingFields);
        }
        if form.password != form.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        if form.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::PasswordTooShort);
        }
        if form.role == Role::SuperAdmin {
            return Err(AccountError::SuperAdminRole);
        }

        let username = Username::parse(&form.username)?;
        let password_hash = hash_password(&form.password)?;

        let status = match creator {
            None => AccountStatus::Active,
            Some(c) if c.is_super_admin() => AccountStatus::Active,
            Some(_) => AccountStatus::Pending,
        };

        let account = Account {
            id: AccountId::generate(),
            username,
            password_hash,
            role: form.role,
            status,
            created_by: creator.map_or_else(|| SYSTEM_USER.to_string(), |c| c.username.clone()),
            created_at: now.with_timezone(&Utc),
            approved_at: None,
            is_super: false,
        };

        {
            let _guard = self.storage.write_lock().await;
            self.accounts
                .insert(&account)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => AccountError::UsernameTaken,
                    other => AccountError::Repository(other),
                })?;
        }

        let needs_approval = status == AccountStatus::Pending;
        tracing::info!(id = %account.id, needs_approval, "Account created");

        Ok(CreatedAccount {
            account: AccountView::from(&account),
            needs_approval,
            message: if needs_approval {
                "Account created. Awaiting Super Admin approval."
            } else {
                "Account created successfully"
            },
        })
    }

    /// Approve a pending account (super admin only).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Forbidden` if the approver is not the super
    /// admin, `AccountError::NotFound` for an unknown ID, and
    /// `AccountError::AlreadyActive` if there is nothing to approve.
    #[instrument(skip(self, approver), fields(approver = %approver.username))]
    pub async fn approve_account(
        &self,
        id: &AccountId,
        approver: &CurrentAccount,
        now: DateTime<FixedOffset>,
    ) -> Result<AccountView, AccountError> {
        if !approver.is_super_admin() {
            return Err(AccountError::Forbidden(
                "Only the Super Admin can approve accounts",
            ));
        }

        let _guard = self.storage.write_lock().await;

        let mut account = self
            .accounts
            .get_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)?;
        if account.is_active() {
            return Err(AccountError::AlreadyActive);
        }

        account.status = AccountStatus::Active;
        account.approved_at = Some(now.with_timezone(&Utc));
        self.accounts.update(&account).await?;

        tracing::info!(id = %account.id, "Account approved");
        Ok(AccountView::from(&account))
    }

    /// Delete an active account or reject a pending one.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` for an unknown ID,
    /// `AccountError::CannotDeleteSuperAdmin` for the super admin,
    /// `AccountError::WouldRemoveSuperAdmin` if no super admin would remain,
    /// and `AccountError::Forbidden` if the actor may not delete the account.
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn delete_account(
        &self,
        id: &AccountId,
        actor: &CurrentAccount,
    ) -> Result<(), AccountError> {
        let _guard = self.storage.write_lock().await;

        let accounts = self.accounts.list_all().await?;
        let target = accounts
            .iter()
            .find(|a| &a.id == id)
            .ok_or(AccountError::NotFound)?;

        if target.is_super {
            tracing::error!("Attempted to delete Super Admin - blocked");
            return Err(AccountError::CannotDeleteSuperAdmin);
        }

        match target.status {
            AccountStatus::Pending if !actor.is_super_admin() => {
                return Err(AccountError::Forbidden(
                    "Only the Super Admin can reject accounts",
                ));
            }
            AccountStatus::Active if !actor.has_permission(Permission::CreateAccount) => {
                return Err(AccountError::Forbidden(
                    "You do not have permission to delete accounts",
                ));
            }
            _ => {}
        }

        let remaining: Vec<Account> = accounts.iter().filter(|a| &a.id != id).cloned().collect();
        if !remaining.iter().any(|a| a.is_super) {
            tracing::error!("Super Admin would be removed - operation cancelled");
            return Err(AccountError::WouldRemoveSuperAdmin);
        }

        self.accounts.save_all(&remaining).await?;
        tracing::info!(%id, "Account deleted");
        Ok(())
    }

    /// List accounts visible to the viewer.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Forbidden` without `view_settings`.
    pub async fn list_accounts(
        &self,
        viewer: &CurrentAccount,
    ) -> Result<AccountListing, AccountError> {
        if !viewer.has_permission(Permission::ViewSettings) {
            return Err(AccountError::Forbidden(
                "You do not have permission to view accounts",
            ));
        }

        let mut listing = AccountListing::default();
        for account in self.accounts.list_all().await? {
            match account.status {
                AccountStatus::Active => listing.active.push(AccountView::from(&account)),
                AccountStatus::Pending if viewer.is_super_admin() => {
                    listing.pending.push(AccountView::from(&account));
                }
                AccountStatus::Pending => {}
            }
        }

        Ok(listing)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check credentials and record a `Logged in` entry.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::PendingApproval` for a pending account with the
    /// right password and `AccountError::InvalidCredentials` otherwise.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<CurrentAccount, AccountError> {
        let username = Username::parse(username).map_err(|_| AccountError::InvalidCredentials)?;

        let account = self
            .accounts
            .get_by_username(&username)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        if !account.is_active() {
            return Err(AccountError::PendingApproval);
        }

        let _guard = self.storage.write_lock().await;
        self.transactions
            .append(Transaction::activity(
                now,
                Activity::LoggedIn,
                account.username.as_str(),
            ))
            .await?;

        tracing::info!(id = %account.id, "Login succeeded");
        Ok(CurrentAccount::from(&account))
    }

    /// Record a `Logged out` entry for the account.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log cannot be written.
    pub async fn logout(
        &self,
        account: &CurrentAccount,
        now: DateTime<FixedOffset>,
    ) -> Result<(), AccountError> {
        let _guard = self.storage.write_lock().await;
        self.transactions
            .append(Transaction::activity(
                now,
                Activity::LoggedOut,
                &account.username,
            ))
            .await?;
        Ok(())
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AccountError> {
    account::hash_password(password).map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AccountError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AccountError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-11-14T09:00:00+08:00").unwrap()
    }

    fn seed() -> SuperAdminSeed {
        SuperAdminSeed {
            username: "owner".to_string(),
            password: SecretString::from("owner-pass"),
        }
    }

    fn form(username: &str, role: Role) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            role,
        }
    }

    async fn super_admin(service: &AccountService<'_>) -> CurrentAccount {
        service.ensure_super_admin(&seed(), now()).await.unwrap();
        service.login("owner", "owner-pass", now()).await.unwrap()
    }

    #[tokio::test]
    async fn test_ensure_super_admin_is_idempotent() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);

        assert!(service.ensure_super_admin(&seed(), now()).await.unwrap().is_some());
        assert!(service.ensure_super_admin(&seed(), now()).await.unwrap().is_none());

        let accounts = AccountRepository::new(&storage).list_all().await.unwrap();
        assert_eq!(accounts.iter().filter(|a| a.is_super).count(), 1);
        assert_eq!(accounts.first().map(|a| a.created_by.as_str()), Some("System"));
    }

    #[tokio::test]
    async fn test_super_admin_creates_active_accounts() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;

        let created = service
            .create_account(&form("maria", Role::Admin), Some(&owner), now())
            .await
            .unwrap();
        assert!(!created.needs_approval);
        assert_eq!(created.message, "Account created successfully");
        assert_eq!(created.account.created_by, "owner");
    }

    #[tokio::test]
    async fn test_admin_creates_pending_accounts() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;
        service
            .create_account(&form("maria", Role::Admin), Some(&owner), now())
            .await
            .unwrap();
        let admin = service.login("maria", "secret1", now()).await.unwrap();

        let created = service
            .create_account(&form("juan", Role::Staff), Some(&admin), now())
            .await
            .unwrap();
        assert!(created.needs_approval);

        let result = service.login("juan", "secret1", now()).await;
        assert!(matches!(result, Err(AccountError::PendingApproval)));
        let result = service.login("juan", "wrong-pass", now()).await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);

        let mut bad = form("maria", Role::Staff);
        bad.confirm_password = "other1".to_string();
        assert!(matches!(
            service.create_account(&bad, None, now()).await,
            Err(AccountError::PasswordMismatch)
        ));

        let mut short = form("maria", Role::Staff);
        short.password = "abc".to_string();
        short.confirm_password = "abc".to_string();
        assert!(matches!(
            service.create_account(&short, None, now()).await,
            Err(AccountError::PasswordTooShort)
        ));

        assert!(matches!(
            service.create_account(&form(" ", Role::Staff), None, now()).await,
            Err(AccountError::MissingFields)
        ));
        assert!(matches!(
            service
                .create_account(&form("boss", Role::SuperAdmin), None, now())
                .await,
            Err(AccountError::SuperAdminRole)
        ));

        service
            .create_account(&form("maria", Role::Staff), None, now())
            .await
            .unwrap();
        assert!(matches!(
            service.create_account(&form("maria", Role::Admin), None, now()).await,
            Err(AccountError::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn test_staff_cannot_create_accounts() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        service
            .create_account(&form("cashier", Role::Staff), None, now())
            .await
            .unwrap();
        let staff = service.login("cashier", "secret1", now()).await.unwrap();

        let result = service
            .create_account(&form("other", Role::Staff), Some(&staff), now())
            .await;
        assert!(matches!(result, Err(AccountError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_login_logs_activity() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;
        service.logout(&owner, now()).await.unwrap();

        let log = TransactionRepository::new(&storage).list_all().await.unwrap();
        let kinds: Vec<TransactionKind> = log.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [
                TransactionKind::Activity(Activity::LoggedOut),
                TransactionKind::Activity(Activity::LoggedIn)
            ]
        );
        assert_eq!(
            log.get(1).and_then(|t| t.details.as_deref()),
            Some("owner logged in.")
        );
    }

    #[tokio::test]
    async fn test_approve_and_reject() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;
        service
            .create_account(&form("maria", Role::Admin), Some(&owner), now())
            .await
            .unwrap();
        let admin = service.login("maria", "secret1", now()).await.unwrap();
        let pending = service
            .create_account(&form("juan", Role::Staff), Some(&admin), now())
            .await
            .unwrap()
            .account;

        assert!(matches!(
            service.approve_account(&pending.id, &admin, now()).await,
            Err(AccountError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete_account(&pending.id, &admin).await,
            Err(AccountError::Forbidden(_))
        ));

        let approved = service
            .approve_account(&pending.id, &owner, now())
            .await
            .unwrap();
        assert_eq!(approved.status, AccountStatus::Active);
        assert!(approved.approved_at.is_some());
        assert!(service.login("juan", "secret1", now()).await.is_ok());

        assert!(matches!(
            service
                .approve_account(&AccountId::new("user_0_missing".to_string()), &owner, now())
                .await,
            Err(AccountError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_super_admin_cannot_be_deleted() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;

        let result = service.delete_account(&owner.id, &owner).await;
        assert!(matches!(result, Err(AccountError::CannotDeleteSuperAdmin)));
    }

    #[tokio::test]
    async fn test_admin_deletes_active_account() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;
        let staff = service
            .create_account(&form("juan", Role::Staff), Some(&owner), now())
            .await
            .unwrap()
            .account;

        service.delete_account(&staff.id, &owner).await.unwrap();
        let listing = service.list_accounts(&owner).await.unwrap();
        assert_eq!(listing.active.len(), 1);
    }

    #[tokio::test]
    async fn test_listing_hides_pending_from_admins() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        let owner = super_admin(&service).await;
        service
            .create_account(&form("maria", Role::Admin), Some(&owner), now())
            .await
            .unwrap();
        let admin = service.login("maria", "secret1", now()).await.unwrap();
        service
            .create_account(&form("juan", Role::Staff), Some(&admin), now())
            .await
            .unwrap();

        assert!(service.list_accounts(&admin).await.unwrap().pending.is_empty());
        assert_eq!(service.list_accounts(&owner).await.unwrap().pending.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_promotes_existing_username() {
        let storage = LocalStorage::in_memory();
        let service = AccountService::new(&storage);
        service
            .create_account(&form("owner", Role::Admin), None, now())
            .await
            .unwrap();

        let restored = service
            .ensure_super_admin(&seed(), now())
            .await
            .unwrap()
            .unwrap();
        assert!(restored.is_super);
        assert_eq!(restored.role, Role::SuperAdmin);
        assert!(service.login("owner", "owner-pass", now()).await.is_ok());
        assert_eq!(
            AccountRepository::new(&storage).list_all().await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_legacy_super_admin_keeps_password_after_upgrade() {
        let storage = LocalStorage::in_memory();
        storage
            .set_item(
                crate::db::keys::ACCOUNTS,
                r#"[{"id":"user_1700000000000_abcdefghi","username":"admin","password":"admin123","role":"Super Admin","status":"active","createdBy":"System","createdAt":"2025-11-14T01:00:00.000Z","isSuper":true}]"#,
            )
            .await
            .unwrap();
        let service = AccountService::new(&storage);

        assert_eq!(service.upgrade_legacy_passwords().await.unwrap(), 1);
        assert!(service.ensure_super_admin(&seed(), now()).await.unwrap().is_none());

        let account = service.login("admin", "admin123", now()).await.unwrap();
        assert!(account.is_super_admin());
        assert!(matches!(
            service.login("admin", "wrong-pass", now()).await,
            Err(AccountError::InvalidCredentials)
        ));
    }
}
