//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands.

pub mod add;
pub mod copy;
pub mod delete;
pub mod display;
pub mod list;
pub mod watch;

use mfaman_core::config::toml_config::load_config;
use mfaman_core::error::MfaError;
use mfaman_core::scheduler::RefreshScheduler;

/// Build a scheduler from the user's configuration and load the stored set
pub async fn open_scheduler() -> Result<RefreshScheduler, MfaError> {
    let config = load_config()?;
    let mut scheduler = RefreshScheduler::from_config(&config)?;
    scheduler.reload().await?;
    Ok(scheduler)
}
