//! Configuration module
//!
//! Handles loading and saving application configuration from TOML files.

use crate::auth::totp::HashAlgorithm;
use crate::error::{ConfigError, MfaError};
use crate::scheduler::refresh::SchedulerPolicy;
use crate::store::{CredentialStore, FileStore, KeyringStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod toml_config;

/// Which backend holds the credential record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// System keyring entry
    Keyring,
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend (default: the config directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Parameters of the RFC 6238 generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpSettings {
    #[serde(default)]
    pub algorithm: HashAlgorithm,

    /// Number of code digits (6-8)
    #[serde(default = "default_digits")]
    pub digits: u32,

    /// Validity window of one code in seconds
    #[serde(default = "default_step_secs")]
    pub step_secs: u64,
}

fn default_digits() -> u32 {
    6
}

fn default_step_secs() -> u64 {
    30
}

impl Default for TotpSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            digits: default_digits(),
            step_secs: default_step_secs(),
        }
    }
}

impl TotpSettings {
    /// Validate the generator settings
    pub fn validate(&self) -> Result<(), String> {
        if !(6..=8).contains(&self.digits) {
            return Err(format!("digits must be between 6 and 8, got: {}", self.digits));
        }

        if self.step_secs < 1 || self.step_secs > 300 {
            return Err(format!(
                "step_secs must be between 1 and 300, got: {}",
                self.step_secs
            ));
        }

        Ok(())
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub totp: TotpSettings,

    #[serde(default)]
    pub scheduler: SchedulerPolicy,
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.totp.validate()?;
        self.scheduler.validate().map_err(|e| e.to_string())?;

        if let Some(dir) = &self.storage.data_dir {
            if dir.as_os_str().is_empty() {
                return Err("data_dir cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Directory holding the file backend's record
    pub fn data_dir(&self) -> Result<PathBuf, MfaError> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => toml_config::get_config_dir(),
        }
    }

    /// Open the credential store selected by `[storage]`
    pub fn open_store(&self) -> Result<CredentialStore, MfaError> {
        let store = match self.storage.backend {
            StorageBackend::File => CredentialStore::new(Box::new(FileStore::new(self.data_dir()?))),
            StorageBackend::Keyring => CredentialStore::new(Box::new(KeyringStore::new())),
        };
        Ok(store)
    }
}

impl From<String> for ConfigError {
    fn from(message: String) -> Self {
        ConfigError::ValidationError { message }
    }
}
