//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Every variable is optional; the defaults match a local development setup.
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for shop data
//!   (falls back to `DATABASE_URL`, default: `postgres://localhost:5432/bunny_shop_app`)
//! - `MAIN_DATABASE_URL` - `PostgreSQL` connection string for the app-builder
//!   database holding admin configuration (falls back to `MAIN_DB_URI`,
//!   default: `postgres://localhost:5432/appifyours`)
//! - `ADMIN_CONFIG_ID` - Key of the admin document to project (default: `69021d2a2b0d7cd49d0bf5b4`)
//! - `STOREFRONT_HOST` - Bind address (default: 0.0.0.0)
//! - `STOREFRONT_PORT` - Listen port (falls back to `PORT`, default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/bunny_shop_app";
const DEFAULT_MAIN_DATABASE_URL: &str = "postgres://localhost:5432/appifyours";

/// Admin whose app-builder document drives `/api/app-config` and the dynamic feed.
pub const DEFAULT_ADMIN_CONFIG_ID: &str = "69021d2a2b0d7cd49d0bf5b4";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` URL for products, users, carts and orders (contains password)
    pub database_url: SecretString,
    /// `PostgreSQL` URL for the app-builder database (contains password)
    pub main_database_url: SecretString,
    /// Key of the admin configuration document
    pub admin_config_id: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url(
            &["STOREFRONT_DATABASE_URL", "DATABASE_URL"],
            DEFAULT_DATABASE_URL,
        );
        let main_database_url = get_database_url(
            &["MAIN_DATABASE_URL", "MAIN_DB_URI"],
            DEFAULT_MAIN_DATABASE_URL,
        );
        let admin_config_id = get_env_or_default("ADMIN_CONFIG_ID", DEFAULT_ADMIN_CONFIG_ID);

        let host = get_env_or_default("STOREFRONT_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_optional_env("STOREFRONT_PORT")
            .or_else(|| get_optional_env("PORT"))
            .map_or(Ok(3000), |raw| parse_port(&raw))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            database_url,
            main_database_url,
            admin_config_id,
            host,
            port,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the first set variable among `keys`, or `default`.
fn get_database_url(keys: &[&str], default: &str) -> SecretString {
    keys.iter()
        .find_map(|key| get_optional_env(key))
        .map_or_else(|| SecretString::from(default), SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))
}

/// Parse a sample rate in `[0.0, 1.0]`.
fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
