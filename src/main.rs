//! mfaman - TOTP credential manager
//!
//! A command-line authenticator that keeps every stored credential's
//! code and countdown current.

use clap::{Parser, Subcommand};
use mfaman_core::{error::MfaError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "mfaman")]
#[command(about = "TOTP credential manager with live code refresh")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every credential with its current code
    List,
    /// Add a credential (prompts for the secret when omitted)
    Add {
        /// Display name
        title: String,
        /// Base32 shared secret
        secret: Option<String>,
    },
    /// Delete the credential with a secret
    Delete {
        /// Base32 shared secret of the credential
        secret: String,
    },
    /// Show a live countdown until Ctrl-C
    Watch,
    /// Copy a credential's current code to the clipboard
    Copy {
        /// Title or secret of the credential
        name: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => cli::list::run_list().await,
        Commands::Add { title, secret } => cli::add::run_add(&title, secret).await,
        Commands::Delete { secret } => cli::delete::run_delete(&secret).await,
        Commands::Watch => cli::watch::run_watch().await,
        Commands::Copy { name } => cli::copy::run_copy(&name).await,
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            let exit_code = match e {
                // Configuration and input errors (exit code 2)
                MfaError::Config(_) | MfaError::Toml(_) | MfaError::TomlSerialize(_) => 2,
                MfaError::Credential(_) | MfaError::Otp(_) => 2,
                // Runtime errors (exit code 1)
                MfaError::Storage(_)
                | MfaError::Scheduler(_)
                | MfaError::Io(_)
                | MfaError::Clipboard { .. } => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
