//! Artesania CLI - database migrations and catalogue seeding.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! art-cli migrate
//!
//! # Load the built-in sample catalogue
//! art-cli seed
//!
//! # Replace the catalogue with a file
//! art-cli seed --file catalogo.yaml --clear
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert artisans, products and news from a YAML catalogue

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "art-cli")]
#[command(author, version, about = "Artesania CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalogue from a YAML file
    Seed {
        /// Catalogue file (defaults to the built-in sample)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Delete existing artisans, products and news first
        #[arg(long)]
        clear: bool,

        /// Validate the catalogue without writing anything
        #[arg(long, conflicts_with = "clear")]
        check: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear, check } => {
            commands::seed::run(file.as_deref(), clear, check).await?;
        }
    }
    Ok(())
}
