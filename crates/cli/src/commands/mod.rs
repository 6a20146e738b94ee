//! CLI command implementations.

pub mod migrate;
pub mod seed;

use bunny_shop_storefront::config::{ConfigError, StorefrontConfig};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Input file could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Input file is not a usable admin document.
    #[error("Invalid admin document: {0}")]
    InvalidDocument(String),
}

/// Load the shared server configuration.
fn load_config() -> Result<StorefrontConfig, CommandError> {
    Ok(StorefrontConfig::from_env()?)
}
