//! 49 Stores CLI - Backend management tools.
//!
//! # Usage
//!
//! ```bash
//! # Import serviceable locations from a YAML file
//! fortynine-cli locations import data/locations.yaml
//!
//! # Replace the postal codes of cities that already exist
//! fortynine-cli locations import data/locations.yaml --replace
//!
//! # Check that the commerce API is reachable
//! fortynine-cli health
//! ```
//!
//! # Commands
//!
//! - `locations import` - Bulk-load serviceable cities into the backend
//! - `health` - Ping the commerce API
//!
//! All commands read `COMMERCE_API_URL` from the environment; `locations
//! import` additionally needs `ADMIN_EMAIL` and `ADMIN_PASSWORD` for a
//! staff account.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fortynine-cli")]
#[command(author, version, about = "49 Stores CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage serviceable locations
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },
    /// Check that the commerce API is reachable
    Health,
}

#[derive(Subcommand)]
enum LocationsAction {
    /// Import serviceable cities from a YAML file
    Import {
        /// Path to the YAML file listing states, cities and postal codes
        file: String,

        /// Replace postal codes of cities that already exist
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Locations { action } => match action {
            LocationsAction::Import { file, replace } => {
                commands::locations::import(&file, replace).await?;
            }
        },
        Commands::Health => commands::health::check().await?,
    }
    Ok(())
}
