//! TOTP (Time-based One-Time Password) generation
//!
//! Implements RFC 6238 TOTP using the totp-lite crate. The scheduler only
//! sees the [`TotpGenerator`] boundary: a secret and the current time in,
//! a code and its expiry out.

use crate::auth::base32::decode_base32;
use crate::error::OtpError;
use crate::types::{GeneratedCode, OtpSecret, TotpToken};
use serde::{Deserialize, Serialize};
use totp_lite::{Sha1, Sha256, Sha512};

/// Hash algorithm for TOTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

/// Source of TOTP codes for the refresh scheduler
pub trait TotpGenerator: Send + Sync {
    /// Generate the code valid at `now_ms` (epoch milliseconds)
    ///
    /// The returned expiry is always strictly later than `now_ms`.
    fn generate(&self, secret: &OtpSecret, now_ms: u64) -> Result<GeneratedCode, OtpError>;
}

/// RFC 6238 generator with fixed algorithm, digit count and time step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rfc6238Generator {
    algorithm: HashAlgorithm,
    digits: u32,
    step_secs: u64,
}

impl Rfc6238Generator {
    pub fn new(algorithm: HashAlgorithm, digits: u32, step_secs: u64) -> Self {
        Self {
            algorithm,
            digits,
            step_secs,
        }
    }
}

impl Default for Rfc6238Generator {
    /// SHA1, 6 digits, 30 second step
    fn default() -> Self {
        Self::new(HashAlgorithm::Sha1, 6, 30)
    }
}

impl TotpGenerator for Rfc6238Generator {
    fn generate(&self, secret: &OtpSecret, now_ms: u64) -> Result<GeneratedCode, OtpError> {
        if self.step_secs == 0 {
            return Err(OtpError::GenerationFailed);
        }

        let token = generate_totp_at(secret, self.algorithm, self.digits, self.step_secs, now_ms / 1000)?;

        let counter = now_ms / 1000 / self.step_secs;
        let expires_at_ms = (counter + 1) * self.step_secs * 1000;

        Ok(GeneratedCode::new(token, expires_at_ms))
    }
}

/// Generate a TOTP token for a Base32-encoded secret at a given Unix time
pub fn generate_totp_at(
    secret: &OtpSecret,
    algorithm: HashAlgorithm,
    digits: u32,
    step_secs: u64,
    unix_secs: u64,
) -> Result<TotpToken, OtpError> {
    let secret_bytes = decode_base32(secret.expose())?;

    let token = match algorithm {
        HashAlgorithm::Sha1 => {
            totp_lite::totp_custom::<Sha1>(step_secs, digits, &secret_bytes, unix_secs)
        }
        HashAlgorithm::Sha256 => {
            totp_lite::totp_custom::<Sha256>(step_secs, digits, &secret_bytes, unix_secs)
        }
        HashAlgorithm::Sha512 => {
            totp_lite::totp_custom::<Sha512>(step_secs, digits, &secret_bytes, unix_secs)
        }
    };

    Ok(TotpToken::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 6238 appendix B seed "12345678901234567890"
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn rfc_secret() -> OtpSecret {
        OtpSecret::new(RFC_SECRET.to_string())
    }

    #[test]
    fn test_rfc6238_vector_sha1() {
        let generator = Rfc6238Generator::new(HashAlgorithm::Sha1, 8, 30);
        let code = generator.generate(&rfc_secret(), 59_000).unwrap();

        assert_eq!(code.token.expose(), "94287082");
        assert_eq!(code.expires_at_ms, 60_000);
    }

    #[test]
    fn test_leading_zero_is_preserved() {
        let generator = Rfc6238Generator::new(HashAlgorithm::Sha1, 8, 30);
        let code = generator.generate(&rfc_secret(), 1_111_111_109_000).unwrap();

        assert_eq!(code.token.expose(), "07081804");
    }

    #[test]
    fn test_default_generator_six_digits() {
        let generator = Rfc6238Generator::default();
        let code = generator.generate(&rfc_secret(), 59_000).unwrap();

        assert_eq!(code.token.expose(), "287082");
        assert!(code.token.expose().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_expiry_is_strictly_after_now() {
        let generator = Rfc6238Generator::default();

        for now_ms in [0, 29_999, 30_000, 30_001, 1_700_000_000_000] {
            let code = generator.generate(&rfc_secret(), now_ms).unwrap();
            assert!(code.expires_at_ms > now_ms, "expiry must follow {}", now_ms);
            assert!(code.expires_at_ms - now_ms <= 30_000);
            assert_eq!(code.expires_at_ms % 30_000, 0);
        }
    }

    #[test]
    fn test_invalid_secret() {
        let generator = Rfc6238Generator::default();
        let secret = OtpSecret::new("NOT-BASE32!".to_string());

        assert_eq!(
            generator.generate(&secret, 59_000),
            Err(OtpError::InvalidBase32)
        );
    }

    #[test]
    fn test_zero_step_fails() {
        let generator = Rfc6238Generator::new(HashAlgorithm::Sha1, 6, 0);
        assert_eq!(
            generator.generate(&rfc_secret(), 59_000),
            Err(OtpError::GenerationFailed)
        );
    }

    #[test]
    fn test_algorithm_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            algorithm: HashAlgorithm,
        }

        let parsed: Wrapper = toml::from_str(r#"algorithm = "sha256""#).unwrap();
        assert_eq!(parsed.algorithm, HashAlgorithm::Sha256);
    }
}
