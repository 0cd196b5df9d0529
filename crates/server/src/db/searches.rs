//! Recent POS search terms over the `recent_searches` blob.

use super::{LocalStorage, RepositoryError, keys};

/// Maximum number of remembered search terms.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Repository for recent search terms.
pub struct SearchRepository<'a> {
    storage: &'a LocalStorage,
}

impl<'a> SearchRepository<'a> {
    /// Create a new search repository.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage) -> Self {
        Self { storage }
    }

    /// Recent terms, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored list is invalid.
    pub async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .storage
            .read_json(keys::RECENT_SEARCHES)
            .await?
            .unwrap_or_default())
    }

    /// Record a term at the front of the list.
    ///
    /// Blank terms are ignored. An earlier entry equal to `term` ignoring case
    /// is dropped, and the list is capped at [`MAX_RECENT_SEARCHES`].
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or written.
    pub async fn record(&self, term: &str) -> Result<Vec<String>, RepositoryError> {
        let term = term.trim();
        let mut recents = self.list().await?;
        if term.is_empty() {
            return Ok(recents);
        }

        let lowered = term.to_lowercase();
        recents.retain(|existing| existing.to_lowercase() != lowered);
        recents.insert(0, term.to_owned());
        recents.truncate(MAX_RECENT_SEARCHES);

        self.storage
            .write_json(keys::RECENT_SEARCHES, &recents)
            .await?;
        Ok(recents)
    }
}
