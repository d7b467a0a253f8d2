//! Error types for the mfaman credential manager
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the mfaman application
#[derive(Error, Debug)]
pub enum MfaError {
    /// Errors related to the persisted credential record
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Errors related to OTP/TOTP operations
    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    /// Errors related to credential creation and lookup
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to the refresh scheduler lifecycle
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Clipboard access errors
    #[error("Clipboard error: {reason}")]
    Clipboard { reason: String },
}

/// Credential record persistence errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Stored credentials are corrupt: {reason}")]
    Corrupt { reason: String },
}

/// OTP/TOTP operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Invalid Base32 secret")]
    InvalidBase32,

    #[error("TOTP generation failed")]
    GenerationFailed,
}

/// Credential validation and lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential title cannot be empty")]
    EmptyTitle,

    #[error("Credential secret cannot be empty")]
    EmptySecret,

    #[error("Secret is already registered as '{title}'")]
    DuplicateSecret { title: String },

    #[error("No credential matches '{name}'")]
    NotFound { name: String },
}

/// Refresh scheduler lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Refresh scheduler has stopped")]
    Stopped,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}
