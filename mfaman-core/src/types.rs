//! Type definitions and wrappers for secure data handling
//!
//! This module provides type-safe wrappers for sensitive data using the
//! secrecy crate to prevent accidental exposure in logs or debug output,
//! plus the in-memory and persisted shapes of a credential.

use crate::error::CredentialError;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize};

/// Storage key under which the whole credential set is persisted
pub const CREDENTIALS_KEY: &str = "mfaman.credentials";

/// Keyring service name used by the keyring storage backend
pub const KEYRING_SERVICE: &str = "mfaman";

/// Wrapper for a shared TOTP secret
///
/// The secret doubles as the identity key of a credential inside the
/// refresh scheduler, so it is normalized once at creation time:
/// whitespace removed and upper-cased.
#[derive(Clone, Debug)]
pub struct OtpSecret(Secret<String>);

impl OtpSecret {
    /// Create a new OtpSecret from raw text, as stored
    pub fn new(secret: String) -> Self {
        Self(Secret::new(secret))
    }

    /// Create a secret from user input, normalizing its text
    pub fn normalized(input: &str) -> Self {
        let cleaned: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        Self::new(cleaned)
    }

    /// Expose the secret value (use with caution!)
    ///
    /// This should only be called when absolutely necessary,
    /// such as when passing to cryptographic functions or comparing keys.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl PartialEq for OtpSecret {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for OtpSecret {}

impl From<String> for OtpSecret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

/// Wrapper for generated TOTP tokens
///
/// Tokens are fixed-width decimal text; leading zeros are significant,
/// so they are never converted to integers.
#[derive(Clone, Debug)]
pub struct TotpToken(Secret<String>);

impl TotpToken {
    /// Create a new TotpToken from a generated token string
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    /// Expose the token value (use with caution!)
    ///
    /// This should only be called when rendering the token for the user
    /// or persisting it.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for TotpToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for TotpToken {}

impl From<String> for TotpToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// Result of one successful generation: the code and its expiry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedCode {
    pub token: TotpToken,
    /// Epoch milliseconds at which `token` stops being valid
    pub expires_at_ms: u64,
}

impl GeneratedCode {
    pub fn new(token: TotpToken, expires_at_ms: u64) -> Self {
        Self {
            token,
            expires_at_ms,
        }
    }
}

/// Seconds left until `expires_at_ms`, clamped at zero
pub fn seconds_until(expires_at_ms: u64, now_ms: u64) -> f64 {
    expires_at_ms.saturating_sub(now_ms) as f64 / 1000.0
}

/// A managed TOTP credential as published to subscribers
///
/// `code` is either absent (never generated, or last generation failed) or
/// holds a code together with its expiry; the two never drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct Credential {
    pub title: String,
    pub secret: OtpSecret,
    pub code: Option<GeneratedCode>,
    /// Derived from `code.expires_at_ms` and the clock on every update
    pub seconds_remaining: f64,
    /// Reason of the last failed generation, cleared by the next success
    pub error: Option<String>,
}

impl Credential {
    /// Create a never-generated credential from user input
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::EmptyTitle` or `CredentialError::EmptySecret`
    /// when either field is blank.
    pub fn new(title: &str, secret: &str) -> Result<Self, CredentialError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CredentialError::EmptyTitle);
        }

        let secret = OtpSecret::normalized(secret);
        if secret.is_empty() {
            return Err(CredentialError::EmptySecret);
        }

        Ok(Self {
            title: title.to_string(),
            secret,
            code: None,
            seconds_remaining: 0.0,
            error: None,
        })
    }

    /// Identity key of this credential within a running scheduler
    pub fn key(&self) -> &str {
        self.secret.expose()
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.code.as_ref().map_or(0, |c| c.expires_at_ms)
    }

    /// True when the credential has no usable code at `now_ms`
    ///
    /// Covers never generated, failed, and already expired.
    pub fn needs_regeneration(&self, now_ms: u64) -> bool {
        match &self.code {
            None => true,
            Some(code) => code.expires_at_ms == 0 || code.expires_at_ms < now_ms,
        }
    }

    pub fn seconds_remaining_at(&self, now_ms: u64) -> f64 {
        seconds_until(self.expires_at_ms(), now_ms)
    }

    /// Store a fresh generation, replacing code and expiry together
    pub fn apply_code(&mut self, code: GeneratedCode, now_ms: u64) {
        self.seconds_remaining = seconds_until(code.expires_at_ms, now_ms);
        self.code = Some(code);
        self.error = None;
    }

    /// Mark the code unavailable after a failed generation
    pub fn mark_invalid(&mut self, reason: String) {
        self.code = None;
        self.seconds_remaining = 0.0;
        self.error = Some(reason);
    }
}

/// Persisted shape of one credential
///
/// `code` is written as text; records written by older versions carry an
/// integer code, which is still accepted. Secrets are normalized on read,
/// so hand-edited or legacy records key the same as freshly added ones. `expirationDisplay` is kept for
/// readers of the record but never trusted on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub title: String,
    pub secret: String,
    #[serde(default, deserialize_with = "code_from_text_or_number")]
    pub code: String,
    #[serde(default)]
    pub expiration: u64,
    #[serde(default)]
    pub expiration_display: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCode {
    Text(String),
    Number(u64),
}

fn code_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StoredCode::deserialize(deserializer)? {
        StoredCode::Text(text) => text,
        StoredCode::Number(0) => String::new(),
        StoredCode::Number(n) => n.to_string(),
    })
}

impl From<StoredCredential> for Credential {
    fn from(stored: StoredCredential) -> Self {
        let code = if stored.code.is_empty() || stored.expiration == 0 {
            None
        } else {
            Some(GeneratedCode::new(
                TotpToken::new(stored.code),
                stored.expiration,
            ))
        };

        Self {
            title: stored.title,
            secret: OtpSecret::normalized(&stored.secret),
            code,
            seconds_remaining: 0.0,
            error: None,
        }
    }
}

impl From<&Credential> for StoredCredential {
    fn from(credential: &Credential) -> Self {
        Self {
            title: credential.title.clone(),
            secret: credential.secret.expose().to_string(),
            code: credential
                .code
                .as_ref()
                .map(|c| c.token.expose().to_string())
                .unwrap_or_default(),
            expiration: credential.expires_at_ms(),
            expiration_display: credential.seconds_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_normalization() {
        let secret = OtpSecret::normalized(" jbsw y3dp\tehpk 3pxp ");
        assert_eq!(secret.expose(), "JBSWY3DPEHPK3PXP");
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = OtpSecret::new("JBSWY3DPEHPK3PXP".to_string());
        assert!(!format!("{:?}", secret).contains("JBSWY3DPEHPK3PXP"));
    }

    #[test]
    fn test_new_credential_rejects_blank_fields() {
        assert_eq!(
            Credential::new("  ", "JBSWY3DPEHPK3PXP").unwrap_err(),
            CredentialError::EmptyTitle
        );
        assert_eq!(
            Credential::new("GitHub", " \t ").unwrap_err(),
            CredentialError::EmptySecret
        );
    }

    #[test]
    fn test_needs_regeneration() {
        let mut credential = Credential::new("GitHub", "JBSWY3DPEHPK3PXP").unwrap();
        assert!(credential.needs_regeneration(1_000));

        credential.apply_code(GeneratedCode::new(TotpToken::from("012345".to_string()), 30_000), 1_000);
        assert!(!credential.needs_regeneration(29_999));
        assert!(!credential.needs_regeneration(30_000));
        assert!(credential.needs_regeneration(30_001));
    }

    #[test]
    fn test_seconds_remaining_is_clamped() {
        assert_eq!(seconds_until(30_000, 27_500), 2.5);
        assert_eq!(seconds_until(30_000, 90_000), 0.0);
    }

    #[test]
    fn test_mark_invalid_clears_code() {
        let mut credential = Credential::new("GitHub", "JBSWY3DPEHPK3PXP").unwrap();
        credential.apply_code(GeneratedCode::new(TotpToken::from("123456".to_string()), 30_000), 0);
        credential.mark_invalid("Invalid Base32 secret".to_string());

        assert!(credential.code.is_none());
        assert_eq!(credential.seconds_remaining, 0.0);
        assert_eq!(credential.error.as_deref(), Some("Invalid Base32 secret"));
    }

    #[test]
    fn test_stored_legacy_integer_code() {
        let json = r#"{"title":"AWS","secret":"ABC","code":12345,"expiration":60000,"expirationDisplay":3.2}"#;
        let stored: StoredCredential = serde_json::from_str(json).unwrap();
        assert_eq!(stored.code, "12345");

        let zero = r#"{"title":"AWS","secret":"ABC","code":0,"expiration":0,"expirationDisplay":0}"#;
        let stored: StoredCredential = serde_json::from_str(zero).unwrap();
        assert_eq!(stored.code, "");
    }

    #[test]
    fn test_half_generated_record_reads_as_never_generated() {
        let stored = StoredCredential {
            title: "AWS".to_string(),
            secret: "ABC".to_string(),
            code: "123456".to_string(),
            expiration: 0,
            expiration_display: 0.0,
        };
        let credential = Credential::from(stored);
        assert!(credential.code.is_none());
    }

    #[test]
    fn test_stored_secret_is_normalized_on_read() {
        let stored = StoredCredential {
            title: "GitHub".to_string(),
            secret: "jbsw y3dp ehpk 3pxp".to_string(),
            code: String::new(),
            expiration: 0,
            expiration_display: 0.0,
        };
        let credential = Credential::from(stored);
        assert_eq!(credential.key(), "JBSWY3DPEHPK3PXP");
    }

    #[test]
    fn test_stored_keeps_leading_zeros() {
        let mut credential = Credential::new("GitHub", "JBSWY3DPEHPK3PXP").unwrap();
        credential.apply_code(GeneratedCode::new(TotpToken::from("004211".to_string()), 30_000), 0);

        let stored = StoredCredential::from(&credential);
        assert_eq!(stored.code, "004211");
        assert_eq!(stored.expiration, 30_000);

        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"expirationDisplay\""));
        assert!(json.contains("\"004211\""));
    }
}
