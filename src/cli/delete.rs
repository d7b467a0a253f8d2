//! Delete command implementation

use crate::cli::open_scheduler;
use mfaman_core::error::MfaError;

/// Delete the credential whose secret matches
///
/// An unknown secret is reported but is not an error.
pub async fn run_delete(secret: &str) -> Result<(), MfaError> {
    let mut scheduler = open_scheduler().await?;
    let deleted = scheduler.delete(secret).await;
    scheduler.shutdown();

    if deleted? {
        println!("✅ Credential deleted.");
    } else {
        println!("No credential uses that secret; nothing deleted.");
    }

    Ok(())
}
