//! Integration tests for the mfaman binary
//!
//! Every test points MFAMAN_CONFIG_DIR at a fresh temporary directory, so
//! the default file backend writes there and the user's data is untouched.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MFAMAN_BINARY: &str = env!("CARGO_BIN_EXE_mfaman");

// RFC 6238 appendix B seed "12345678901234567890"
const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

fn mfaman(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(MFAMAN_BINARY)
        .args(args)
        .env("MFAMAN_CONFIG_DIR", config_dir)
        .env("MFAMAN_LOG", "error")
        .env_remove("JOURNAL_STREAM")
        .output()
        .expect("Failed to run mfaman")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = mfaman(dir.path(), &["--help"]);

    assert!(output.status.success());
    let help = stdout(&output);
    for command in ["list", "add", "delete", "watch", "copy"] {
        assert!(help.contains(command), "help should mention {}", command);
    }
}

#[test]
fn test_list_empty_store() {
    let dir = TempDir::new().unwrap();
    let output = mfaman(dir.path(), &["list"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No credentials stored"));
}

#[test]
fn test_add_list_delete_flow() {
    let dir = TempDir::new().unwrap();

    let added = mfaman(dir.path(), &["add", "GitHub", RFC_SECRET]);
    assert!(added.status.success(), "stderr: {}", stderr(&added));
    assert!(stdout(&added).contains("Credential added"));

    let record = dir.path().join("mfaman.credentials.json");
    let json = std::fs::read_to_string(&record).unwrap();
    assert!(json.contains("\"GitHub\""));
    assert!(json.contains("\"expirationDisplay\""));

    let listed = mfaman(dir.path(), &["list"]);
    assert!(listed.status.success());
    assert!(stdout(&listed).contains("GitHub"));

    let deleted = mfaman(dir.path(), &["delete", RFC_SECRET]);
    assert!(deleted.status.success(), "stderr: {}", stderr(&deleted));
    assert!(stdout(&deleted).contains("Credential deleted"));

    let listed = mfaman(dir.path(), &["list"]);
    assert!(stdout(&listed).contains("No credentials stored"));
}

#[test]
fn test_duplicate_secret_is_rejected() {
    let dir = TempDir::new().unwrap();

    assert!(mfaman(dir.path(), &["add", "GitHub", RFC_SECRET]).status.success());

    // Same secret after normalization
    let lowered = RFC_SECRET.to_lowercase();
    let output = mfaman(dir.path(), &["add", "Other", &lowered]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("already registered as 'GitHub'"));
}

#[test]
fn test_invalid_secret_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = mfaman(dir.path(), &["add", "Broken", "NOT-BASE32!"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid Base32 secret"));
    assert!(!dir.path().join("mfaman.credentials.json").exists());
}

#[test]
fn test_delete_unknown_secret_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let output = mfaman(dir.path(), &["delete", "JBSWY3DPEHPK3PXP"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("nothing deleted"));
}

#[test]
fn test_copy_unknown_name() {
    let dir = TempDir::new().unwrap();
    let output = mfaman(dir.path(), &["copy", "Nope"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("No credential matches 'Nope'"));
}

#[test]
fn test_invalid_config_exit_code() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[totp]\ndigits = 12\n").unwrap();

    let output = mfaman(dir.path(), &["list"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("digits must be between 6 and 8"));
}

#[test]
fn test_corrupt_record_exit_code() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("mfaman.credentials.json"), "{not json").unwrap();

    let output = mfaman(dir.path(), &["list"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("corrupt"));
}

#[test]
fn test_unparsable_config_exit_code() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[totp\n").unwrap();

    let output = mfaman(dir.path(), &["list"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("TOML parsing error"));
}
