//! Authentication module
//!
//! Handles secret decoding and TOTP code generation.

pub mod base32;
pub mod totp;
