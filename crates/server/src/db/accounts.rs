//! Account repository over the `userAccounts` blob.
//!
//! Write methods read, modify and rewrite the whole collection; callers must
//! hold [`LocalStorage::write_lock`] around them.
//!
//! Older blobs keep the plaintext under `password` instead of `passwordHash`.
//! Such rows are hashed as they are read and rewritten in the hashed form by
//! [`AccountRepository::upgrade_legacy_passwords`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{AccountId, AccountStatus, Role, Username};

use super::{LocalStorage, RepositoryError, keys};
use crate::models::Account;
use crate::models::account::hash_password;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Stored account record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRow {
    id: String,
    username: String,
    #[serde(default)]
    password_hash: String,
    /// Plaintext password of a legacy row. Never written back.
    #[serde(default, skip_serializing)]
    password: Option<String>,
    role: Role,
    status: AccountStatus,
    created_by: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_super: bool,
}

impl AccountRow {
    fn is_legacy(&self) -> bool {
        self.password_hash.is_empty() && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username for {}: {e}", row.id))
        })?;

        let password_hash = match (row.password_hash.is_empty(), row.password) {
            (false, _) => row.password_hash,
            (true, Some(plaintext)) if !plaintext.is_empty() => hash_password(&plaintext)
                .map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "cannot hash legacy password for {}: {e}",
                        row.id
                    ))
                })?,
            (true, _) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "missing password hash for {}",
                    row.id
                )));
            }
        };

        Ok(Self {
            id: AccountId::new(row.id),
            username,
            password_hash,
            role: row.role,
            status: row.status,
            created_by: row.created_by,
            created_at: row.created_at,
            approved_at: row.approved_at,
            is_super: row.is_super,
        })
    }
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.to_string(),
            password_hash: account.password_hash.clone(),
            password: None,
            role: account.role,
            status: account.status,
            created_by: account.created_by.clone(),
            created_at: account.created_at,
            approved_at: account.approved_at,
            is_super: account.is_super,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for account records.
pub struct AccountRepository<'a> {
    storage: &'a LocalStorage,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage) -> Self {
        Self { storage }
    }

    /// List all accounts in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid.
    pub async fn list_all(&self) -> Result<Vec<Account>, RepositoryError> {
        self.rows()
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    async fn rows(&self) -> Result<Vec<AccountRow>, RepositoryError> {
        Ok(self
            .storage
            .read_json(keys::ACCOUNTS)
            .await?
            .unwrap_or_default())
    }

    /// Rewrite rows that still carry a plaintext `password` with an Argon2
    /// hash. Returns the number of rows upgraded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid, or
    /// an error if the collection cannot be written.
    pub async fn upgrade_legacy_passwords(&self) -> Result<usize, RepositoryError> {
        let rows = self.rows().await?;
        let legacy = rows.iter().filter(|row| row.is_legacy()).count();
        if legacy == 0 {
            return Ok(0);
        }

        let accounts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Account>, _>>()?;
        self.save_all(&accounts).await?;
        Ok(legacy)
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid.
    pub async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.list_all().await?.into_iter().find(|a| &a.id == id))
    }

    /// Get an account by exact username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a record is invalid.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|a| &a.username == username))
    }

    /// Append a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is already taken.
    pub async fn insert(&self, account: &Account) -> Result<(), RepositoryError> {
        let mut accounts = self.list_all().await?;

        if accounts.iter().any(|a| a.username == account.username) {
            return Err(RepositoryError::Conflict(format!(
                "username {} already exists",
                account.username
            )));
        }

        accounts.push(account.clone());
        self.save_all(&accounts).await
    }

    /// Replace an existing account record, matched by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has the ID.
    pub async fn update(&self, account: &Account) -> Result<(), RepositoryError> {
        let mut accounts = self.list_all().await?;

        let slot = accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = account.clone();

        self.save_all(&accounts).await
    }

    /// Overwrite the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub async fn save_all(&self, accounts: &[Account]) -> Result<(), RepositoryError> {
        let rows: Vec<AccountRow> = accounts.iter().map(AccountRow::from).collect();
        self.storage.write_json(keys::ACCOUNTS, &rows).await
    }
}
