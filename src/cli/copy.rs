//! Copy command implementation

use crate::cli::open_scheduler;
use mfaman_core::error::{CredentialError, MfaError};
use mfaman_core::types::OtpSecret;
use tracing::debug;

/// Copy the current code of the credential matching `name`
///
/// `name` is matched against titles first (case-insensitive), then secrets.
pub async fn run_copy(name: &str) -> Result<(), MfaError> {
    let mut scheduler = open_scheduler().await?;
    let view = scheduler.view();
    scheduler.shutdown();

    let key = OtpSecret::normalized(name);
    let credential = view
        .iter()
        .find(|c| c.title.eq_ignore_ascii_case(name.trim()))
        .or_else(|| view.iter().find(|c| c.secret == key))
        .ok_or_else(|| CredentialError::NotFound {
            name: name.to_string(),
        })?;

    let Some(code) = &credential.code else {
        return Err(MfaError::Clipboard {
            reason: format!(
                "'{}' has no valid code: {}",
                credential.title,
                credential.error.as_deref().unwrap_or("not generated")
            ),
        });
    };

    let mut clipboard = arboard::Clipboard::new().map_err(|e| MfaError::Clipboard {
        reason: format!("Failed to initialize clipboard: {}", e),
    })?;
    clipboard
        .set_text(code.token.expose().to_string())
        .map_err(|e| MfaError::Clipboard {
            reason: format!("Failed to copy to clipboard: {}", e),
        })?;

    debug!(title = %credential.title, "Copied code to clipboard");
    println!(
        "📋 Copied code for {} ({}s left)",
        credential.title,
        credential.seconds_remaining.ceil() as u64
    );

    Ok(())
}
