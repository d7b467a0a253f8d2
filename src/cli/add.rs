//! Add command implementation
//!
//! Stores a new credential and shows its first code.

use crate::cli::{display, open_scheduler};
use mfaman_core::error::MfaError;
use std::io::{self, Write};

/// Run the add command
pub async fn run_add(title: &str, secret: Option<String>) -> Result<(), MfaError> {
    let secret = match secret {
        Some(secret) => secret,
        None => prompt_secret()?,
    };

    let mut scheduler = open_scheduler().await?;
    let result = scheduler.add_and_regenerate(title, &secret).await;
    let view = scheduler.view();
    scheduler.shutdown();
    result?;

    println!("✅ Credential added.");
    if let Some(line) = view
        .iter()
        .rev()
        .find(|c| c.title == title.trim())
        .map(display::render_line)
    {
        println!("{}", line);
    }

    Ok(())
}

/// Prompt until a non-empty secret is entered
fn prompt_secret() -> Result<String, MfaError> {
    println!("Enter the TOTP secret (Base32-encoded, e.g., JBSWY3DPEHPK3PXP)");

    loop {
        let secret = prompt_input("TOTP Secret: ")?;

        if secret.trim().is_empty() {
            println!("❌ Secret cannot be empty. Please try again.");
            continue;
        }

        return Ok(secret);
    }
}

/// Low-level input prompting
fn prompt_input(prompt: &str) -> Result<String, MfaError> {
    print!("{}", prompt);
    io::stdout().flush().map_err(MfaError::Io)?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(MfaError::Io)?;

    Ok(input.trim_end().to_string())
}
