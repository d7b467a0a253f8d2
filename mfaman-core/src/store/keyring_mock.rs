//! Mock keyring backend for testing
//!
//! Provides an in-memory keyring that doesn't require system keyring
//! access. Used in CI environments and for testing.

use super::KeyValueStore;
use crate::error::StorageError;
use crate::types::KEYRING_SERVICE;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

lazy_static::lazy_static! {
    static ref MOCK_KEYRING: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());
}

/// Generate a key for the mock keyring
fn make_key(service: &str, account: &str) -> String {
    format!("{}:{}", service, account)
}

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

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let keyring = MOCK_KEYRING.lock().map_err(|_| StorageError::Unavailable {
            reason: "mock keyring lock poisoned".to_string(),
        })?;
        Ok(keyring.get(&make_key(&self.service, key)).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut keyring = MOCK_KEYRING.lock().map_err(|_| StorageError::Unavailable {
            reason: "mock keyring lock poisoned".to_string(),
        })?;
        keyring.insert(make_key(&self.service, key), value);
        Ok(())
    }
}
