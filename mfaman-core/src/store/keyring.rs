//! Keyring storage backend
//!
//! Uses the system keyring (GNOME Keyring / Secret Service on Linux) to
//! hold the serialized credential record. The keyring API is blocking, so
//! every call runs on tokio's blocking pool.

use super::KeyValueStore;
use crate::error::StorageError;
use crate::types::KEYRING_SERVICE;
use async_trait::async_trait;
use keyring::Entry;

#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable(e: impl std::fmt::Display) -> StorageError {
    StorageError::Unavailable {
        reason: format!("Keyring error: {}", e),
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let service = self.service.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key).map_err(unavailable)?;
            match entry.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(unavailable(e)),
            }
        })
        .await
        .map_err(unavailable)?
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let service = self.service.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key).map_err(unavailable)?;
            entry.set_password(&value).map_err(unavailable)
        })
        .await
        .map_err(unavailable)?
    }
}
