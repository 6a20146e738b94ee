//! Bunny Shop CLI - Database migrations and seed data.
//!
//! # Usage
//!
//! ```bash
//! # Run shop database migrations
//! bunny-cli migrate storefront
//!
//! # Run app-builder (admin config) database migrations
//! bunny-cli migrate main
//!
//! # Run all database migrations
//! bunny-cli migrate all
//!
//! # Insert the sample catalog
//! bunny-cli seed products
//!
//! # Store an admin document from a JSON file
//! bunny-cli seed admin-config ./admin.json
//! ```
//!
//! Connection strings are read the same way the server reads them
//! (`STOREFRONT_DATABASE_URL`, `MAIN_DATABASE_URL`, `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "bunny-cli")]
#[command(author, version, about = "Bunny Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Seed databases with data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run shop database migrations
    Storefront,
    /// Run app-builder database migrations
    Main,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert a small sample catalog into an empty product table
    Products,
    /// Upsert the configured admin's document from a JSON file
    AdminConfig {
        /// Path to the JSON document
        file: PathBuf,

        /// Admin id to store the document under (defaults to `ADMIN_CONFIG_ID`)
        #[arg(short, long)]
        admin_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Main => commands::migrate::main_db().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::main_db().await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products => {
                commands::seed::products().await?;
            }
            SeedTarget::AdminConfig { file, admin_id } => {
                commands::seed::admin_config(&file, admin_id).await?;
            }
        },
    }
    Ok(())
}
