//! Orchard CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! orchard-cli migrate
//!
//! # Seed the demo catalog and admin account
//! orchard-cli seed
//! orchard-cli seed --file my-catalog.yaml --clear
//!
//! # Grant admin rights to an existing account
//! orchard-cli user promote -e jane@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog and admin account
//! - `user promote` - Grant or revoke admin rights

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orchard-cli")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog and admin account
    Seed {
        /// YAML seed file (defaults to the bundled demo catalog)
        #[arg(short, long)]
        file: Option<String>,

        /// Delete existing products first
        #[arg(long)]
        clear: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant admin rights
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file, clear } => commands::seed::run(file.as_deref(), clear).await?,
        Commands::User { action } => match action {
            UserAction::Promote { email, revoke } => {
                commands::user::set_admin(&email, !revoke).await?;
            }
        },
    }
    Ok(())
}
