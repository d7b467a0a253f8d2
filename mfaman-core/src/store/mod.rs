//! Credential persistence
//!
//! The whole credential set lives in a single record of a key-value
//! backend. There is no per-credential API: every logical mutation is
//! load, modify, replace-all. Two mutations racing through different
//! stores can therefore lose an update (the later `replace_all` wins);
//! within one refresh scheduler all mutations are serialized.

use crate::error::StorageError;
use crate::types::{Credential, StoredCredential, CREDENTIALS_KEY};
use async_trait::async_trait;
use tracing::{debug, error};

pub mod file;
pub mod memory;

// Use mock keyring in test mode or when the feature is enabled
#[cfg(any(test, feature = "mock-keyring"))]
#[path = "keyring_mock.rs"]
pub mod keyring;

// Use real keyring in production
#[cfg(not(any(test, feature = "mock-keyring")))]
pub mod keyring;

pub use file::FileStore;
pub use keyring::KeyringStore;
pub use memory::MemoryStore;

/// Asynchronous key-value backend holding serialized records
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Load/replace-all access to the persisted credential set
pub struct CredentialStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl CredentialStore {
    /// Create a store over `backend` using the default record key
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(backend, CREDENTIALS_KEY)
    }

    pub fn with_key(backend: Box<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
        }
    }

    /// Return the persisted set, or an empty set if none exists
    pub async fn load(&self) -> Result<Vec<Credential>, StorageError> {
        let Some(raw) = self.backend.get(&self.key).await.map_err(|e| {
            error!(key = %self.key, "Failed to load credentials: {}", e);
            e
        })?
        else {
            debug!(key = %self.key, "No stored credentials, starting empty");
            return Ok(Vec::new());
        };

        let stored: Vec<StoredCredential> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                reason: e.to_string(),
            })?;

        debug!(key = %self.key, count = stored.len(), "Loaded credentials");
        Ok(stored.into_iter().map(Credential::from).collect())
    }

    /// Overwrite the persisted set with `set`
    pub async fn replace_all(&self, set: &[Credential]) -> Result<(), StorageError> {
        let stored: Vec<StoredCredential> = set.iter().map(StoredCredential::from).collect();
        let raw = serde_json::to_string(&stored).map_err(|e| StorageError::Corrupt {
            reason: e.to_string(),
        })?;

        self.backend.set(&self.key, raw).await.map_err(|e| {
            error!(key = %self.key, "Failed to persist credentials: {}", e);
            e
        })?;

        debug!(key = %self.key, count = set.len(), "Persisted credentials");
        Ok(())
    }
}
