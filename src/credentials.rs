//! Persisted credential record: the bearer token that survives restarts.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only [`crate::session::SessionManager`] writes through these stores. Views
//! and API callers read session state, never the store.
//!
//! File layout:
//! ```json
//! { "token": "eyJhbGciOi..." }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// On-disk shape of the credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub token: String,
}

/// Storage for the single persisted bearer token.
pub trait CredentialStore: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the record exists but cannot be read.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the record cannot be written.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the stored token. Removing an absent record is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if an existing record cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON file store, the CLI's equivalent of browser local storage.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: CredentialRecord = serde_json::from_slice(&bytes)?;
        Ok(Some(record.token).filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let record = CredentialRecord { token: token.to_owned() };
        let bytes = serde_json::to_vec_pretty(&record)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store. Counts writes so callers can assert on side effects.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
    saves: AtomicUsize,
    clears: AtomicUsize,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_owned())), ..Self::default() }
    }

    /// Current token without going through the trait.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.token.lock().map(|t| t.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.peek())
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_owned());
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
