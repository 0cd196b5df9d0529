//! Key-value blob store with directory and in-memory backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use super::RepositoryError;

/// Guard returned by [`LocalStorage::write_lock`].
pub type WriteGuard<'a> = MutexGuard<'a, ()>;

enum Backend {
    /// One `<key>.json` file per key.
    Directory(PathBuf),
    /// Process-local map, lost on drop.
    Memory(RwLock<HashMap<String, String>>),
}

/// Durable string store keyed by collection name.
///
/// Values are opaque strings; [`Self::read_json`] and [`Self::write_json`]
/// layer JSON on top.
pub struct LocalStorage {
    backend: Backend,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Directory(dir) => format!("directory({})", dir.display()),
            Backend::Memory(_) => "memory".to_string(),
        };
        f.debug_struct("LocalStorage")
            .field("backend", &backend)
            .finish_non_exhaustive()
    }
}

impl LocalStorage {
    /// Open a directory-backed store, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the directory cannot be created.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Opened local storage");

        Ok(Self {
            backend: Backend::Directory(dir),
            write_lock: Mutex::new(()),
        })
    }

    /// Create an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(RwLock::new(HashMap::new())),
            write_lock: Mutex::new(()),
        }
    }

    /// Acquire the store-wide write lock.
    ///
    /// Hold the guard across any read-modify-write sequence so that
    /// concurrent writers cannot interleave.
    pub async fn write_lock(&self) -> WriteGuard<'_> {
        self.write_lock.lock().await
    }

    /// Get the raw value for a key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidKey` for a malformed key, or
    /// `RepositoryError::Io` if the backing file cannot be read.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        validate_key(key)?;

        match &self.backend {
            Backend::Directory(dir) => match tokio::fs::read_to_string(key_path(dir, key)).await {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            Backend::Memory(map) => Ok(map.read().await.get(key).cloned()),
        }
    }

    /// Set the raw value for a key.
    ///
    /// The directory backend writes to a temporary file, syncs it and
    /// renames it over the target, so readers never see a partial value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidKey` for a malformed key, or
    /// `RepositoryError::Io` if the file cannot be written.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        validate_key(key)?;

        match &self.backend {
            Backend::Directory(dir) => {
                let target = key_path(dir, key);
                let tmp = dir.join(format!("{key}.json.tmp"));

                let file = tokio::fs::File::create(&tmp).await?;
                let mut file = tokio::io::BufWriter::new(file);
                file.write_all(value.as_bytes()).await?;
                file.flush().await?;
                file.into_inner().sync_all().await?;

                tokio::fs::rename(&tmp, &target).await?;
            }
            Backend::Memory(map) => {
                map.write().await.insert(key.to_owned(), value.to_owned());
            }
        }

        Ok(())
    }

    /// Remove a key. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidKey` for a malformed key, or
    /// `RepositoryError::Io` if the file exists but cannot be removed.
    pub async fn remove_item(&self, key: &str) -> Result<(), RepositoryError> {
        validate_key(key)?;

        match &self.backend {
            Backend::Directory(dir) => match tokio::fs::remove_file(key_path(dir, key)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Backend::Memory(map) => {
                map.write().await.remove(key);
                Ok(())
            }
        }
    }

    /// Read and deserialize the JSON value for a key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored value is not
    /// valid JSON for `T`, plus any error from [`Self::get_item`].
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        let Some(raw) = self.get_item(key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid JSON under {key}: {e}")))
    }

    /// Serialize a value as JSON and store it under a key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the value cannot be
    /// serialized, plus any error from [`Self::set_item`].
    pub async fn write_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw).await
    }
}

fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn validate_key(key: &str) -> Result<(), RepositoryError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidKey(key.to_owned()))
    }
}
