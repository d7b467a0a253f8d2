//! Core library for the mfaman TOTP credential manager
//!
//! This crate provides credential persistence, TOTP generation and the
//! refresh scheduler that keeps codes and countdowns current.

pub mod error;
pub mod types;

pub mod auth;
pub mod config;
pub mod scheduler;
pub mod store;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging when running as a service.
/// Otherwise logs to stderr; the filter is read from `MFAMAN_LOG`
/// (default `info`).
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_env("MFAMAN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to use systemd journal logging if available
    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(filter)
                .init();
            return Ok(());
        }
    }

    // Fallback to stderr logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
