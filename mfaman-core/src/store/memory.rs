//! In-process storage backend
//!
//! Clones share the same map, so a caller can keep a handle to inspect
//! or seed what a scheduler persists. Availability can be switched off
//! to simulate an unreachable backing store.

use super::KeyValueStore;
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    available: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Make every subsequent call succeed (`true`) or fail (`false`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing availability
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable {
                reason: "memory store switched off".to_string(),
            })
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        let entries = self.entries.lock().map_err(|_| StorageError::Unavailable {
            reason: "memory store lock poisoned".to_string(),
        })?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable {
            reason: "memory store lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
