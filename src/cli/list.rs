//! List command implementation

use crate::cli::{display, open_scheduler};
use mfaman_core::error::MfaError;

/// Print every credential with a freshly generated code
pub async fn run_list() -> Result<(), MfaError> {
    let mut scheduler = open_scheduler().await?;
    let view = scheduler.view();
    scheduler.shutdown();

    if view.is_empty() {
        println!("No credentials stored. Add one with: mfaman add <title> <secret>");
        return Ok(());
    }

    for line in display::render(&view) {
        println!("{}", line);
    }

    Ok(())
}
