//! TOML configuration file I/O
//!
//! Handles loading and saving the application configuration to/from TOML
//! files in the user's configuration directory.

use crate::config::AppConfig;
use crate::error::{ConfigError, MfaError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/mfaman, or MFAMAN_CONFIG_DIR environment variable if set
pub fn get_config_dir() -> Result<PathBuf, MfaError> {
    // Allow tests to override config directory via environment variable
    if let Ok(config_dir) = std::env::var("MFAMAN_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        MfaError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("mfaman"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, MfaError> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default file, falling back to defaults
pub fn load_config() -> Result<AppConfig, MfaError> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        debug!("No configuration at {:?}, using defaults", config_path);
        return Ok(AppConfig::default());
    }
    load_config_from_path(&config_path)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<AppConfig, MfaError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MfaError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => MfaError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: AppConfig = toml::from_str(&contents)?;

    config.validate().map_err(ConfigError::from)?;

    info!(
        "Loaded configuration: backend={:?}, algorithm={:?}, digits={}, step={}s, tick={}ms, resync_phase={}",
        config.storage.backend,
        config.totp.algorithm,
        config.totp.digits,
        config.totp.step_secs,
        config.scheduler.tick_interval_ms,
        config.scheduler.resync_phase
    );

    Ok(config)
}

/// Save configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<(), MfaError> {
    // Validate configuration before saving
    config.validate().map_err(ConfigError::from)?;

    // Ensure config directory exists
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            MfaError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let toml_string = toml::to_string_pretty(config)?;

    std::fs::write(&path, toml_string).map_err(|_e| {
        MfaError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    info!("Saved configuration to {:?}", path.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::totp::HashAlgorithm;
    use crate::config::StorageBackend;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.storage.backend = StorageBackend::Keyring;
        original.totp.algorithm = HashAlgorithm::Sha512;
        original.totp.digits = 8;
        original.scheduler.resync_phase = true;

        save_config_to_path(&original, &config_path).unwrap();
        let loaded = load_config_from_path(&config_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_missing_file_is_load_failed() {
        let temp_dir = tempdir().unwrap();
        let result = load_config_from_path(temp_dir.path().join("absent.toml"));

        assert!(matches!(
            result,
            Err(MfaError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_is_not_saved() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.totp.digits = 4;

        assert!(matches!(
            save_config_to_path(&config, &config_path),
            Err(MfaError::Config(ConfigError::ValidationError { .. }))
        ));
        assert!(!config_path.exists());
    }
}
