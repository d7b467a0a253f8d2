//! Unit tests for error types and conversions

use mfaman_core::error::{
    ConfigError, CredentialError, MfaError, OtpError, SchedulerError, StorageError,
};

#[test]
fn test_storage_error_display() {
    let error = StorageError::Unavailable {
        reason: "disk gone".to_string(),
    };
    assert_eq!(error.to_string(), "Storage unavailable: disk gone");
}

#[test]
fn test_otp_error_display() {
    assert_eq!(OtpError::InvalidBase32.to_string(), "Invalid Base32 secret");
}

#[test]
fn test_credential_error_display() {
    let error = CredentialError::DuplicateSecret {
        title: "GitHub".to_string(),
    };
    assert_eq!(error.to_string(), "Secret is already registered as 'GitHub'");
}

#[test]
fn test_mfa_error_from_storage() {
    let error: MfaError = StorageError::Corrupt {
        reason: "eof".to_string(),
    }
    .into();
    assert!(matches!(error, MfaError::Storage(StorageError::Corrupt { .. })));
    assert_eq!(
        error.to_string(),
        "Storage error: Stored credentials are corrupt: eof"
    );
}

#[test]
fn test_mfa_error_from_scheduler() {
    let error: MfaError = SchedulerError::Stopped.into();
    assert_eq!(error.to_string(), "Scheduler error: Refresh scheduler has stopped");
}

#[test]
fn test_mfa_error_from_config() {
    let error: MfaError = ConfigError::ValidationError {
        message: "bad".to_string(),
    }
    .into();
    assert!(matches!(error, MfaError::Config(_)));
}

#[test]
fn test_mfa_error_from_io() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: MfaError = io_error.into();
    assert!(matches!(error, MfaError::Io(_)));
}

#[test]
fn test_mfa_error_from_toml() {
    let toml_error = toml::from_str::<toml::Value>("invalid = ").unwrap_err();
    let error: MfaError = toml_error.into();
    assert!(matches!(error, MfaError::Toml(_)));
}
