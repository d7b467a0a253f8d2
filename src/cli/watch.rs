//! Watch command implementation
//!
//! Runs the refresh scheduler in the background and redraws the
//! credential list every time a new set is published.

use crate::cli::{display, open_scheduler};
use mfaman_core::error::MfaError;
use mfaman_core::types::Credential;
use std::io::{self, Write};
use tracing::{debug, info};

/// Clear the screen and move the cursor home
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Run the watch command until Ctrl-C
pub async fn run_watch() -> Result<(), MfaError> {
    let scheduler = open_scheduler().await?;
    let handle = scheduler.spawn();
    let mut updates = handle.subscribe();

    info!("Watching credentials");
    let view = updates.borrow_and_update().clone();
    draw(&view)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    debug!("Scheduler view closed");
                    break;
                }
                let view = updates.borrow_and_update().clone();
                draw(&view)?;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping scheduler");
                break;
            }
        }
    }

    handle.shutdown().await;
    println!();
    Ok(())
}

fn draw(view: &[Credential]) -> Result<(), MfaError> {
    let mut out = io::stdout().lock();
    write!(out, "{}", CLEAR)?;

    if view.is_empty() {
        writeln!(out, "No credentials stored. Add one with: mfaman add <title> <secret>")?;
    }
    for line in display::render(view) {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "\nPress Ctrl-C to quit.")?;
    out.flush()?;
    Ok(())
}
