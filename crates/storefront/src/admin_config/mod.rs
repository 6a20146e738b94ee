//! Client for the app-builder ("main") database.
//!
//! The app builder stores one configuration document per admin in
//! `admin_element_screens`. The storefront only ever reads the document of a
//! single, configured admin. The client wraps its own pool, created once at
//! startup and closed on shutdown.

pub mod conversions;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

pub use conversions::{AdminDocument, AppConfig, DynamicProduct};

/// Errors reading the admin configuration.
#[derive(Debug, Error)]
pub enum AdminConfigError {
    /// Query against the main database failed.
    #[error("main database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The stored document is not a JSON object.
    #[error("invalid admin document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// An admin document together with its row timestamp.
#[derive(Debug, Clone)]
pub struct AdminConfigRecord {
    pub document: AdminDocument,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read-only access to the configured admin's document.
#[derive(Clone)]
pub struct AdminConfigClient {
    pool: PgPool,
    admin_id: String,
}

impl AdminConfigClient {
    /// Create a client for `admin_id` over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool, admin_id: String) -> Self {
        Self { pool, admin_id }
    }

    /// The admin whose document this client reads.
    #[must_use]
    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }

    /// Fetch the admin document, or `None` if the admin has none.
    ///
    /// # Errors
    ///
    /// Returns `AdminConfigError::Database` if the query fails and
    /// `AdminConfigError::InvalidDocument` if the document is not an object.
    #[instrument(skip(self), fields(admin_id = %self.admin_id))]
    pub async fn fetch(&self) -> Result<Option<AdminConfigRecord>, AdminConfigError> {
        let row: Option<(serde_json::Value, Option<DateTime<Utc>>)> = sqlx::query_as(
            r"
            SELECT document, updated_at
            FROM admin_element_screens
            WHERE user_id = $1
            LIMIT 1
            ",
        )
        .bind(&self.admin_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((document, updated_at)) = row else {
            tracing::warn!("Admin configuration not found");
            return Ok(None);
        };

        let document: AdminDocument = serde_json::from_value(document)?;

        Ok(Some(AdminConfigRecord {
            document,
            updated_at,
        }))
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
