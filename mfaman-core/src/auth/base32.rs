//! Lenient Base32 decoding for user-supplied TOTP secrets
//!
//! Authenticator secrets are commonly shown grouped and in lower case
//! ("jbsw y3dp ehpk 3pxp"), and frequently without trailing padding:
//! 1. Remove all whitespace characters
//! 2. Apply padding to 8-character boundaries
//! 3. Decode case-insensitively

use crate::error::OtpError;

/// Remove whitespace from input string
fn clean(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Pad input string to 8-character boundaries
///
/// Formula: padding_length = (8 - (len % 8)) % 8
fn pad(input: &str) -> String {
    let padding_len = (8 - (input.len() % 8)) % 8;
    format!("{}{}", input, "=".repeat(padding_len))
}

/// Decode a Base32 secret to its raw key bytes
pub fn decode_base32(input: &str) -> Result<Vec<u8>, OtpError> {
    let cleaned = clean(input);
    if cleaned.is_empty() {
        return Err(OtpError::InvalidBase32);
    }

    let padded = pad(cleaned.trim_end_matches('='));

    use data_encoding::BASE32;

    BASE32
        .decode(padded.to_uppercase().as_bytes())
        .map_err(|_| OtpError::InvalidBase32)
}
