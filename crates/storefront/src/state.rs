//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::admin_config::AdminConfigClient;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    admin_config: AdminConfigClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration (supplies the admin id)
    /// * `pool` - `PostgreSQL` pool for shop data
    /// * `main_pool` - `PostgreSQL` pool for the app-builder database
    #[must_use]
    pub fn new(config: &StorefrontConfig, pool: PgPool, main_pool: PgPool) -> Self {
        let admin_config = AdminConfigClient::new(main_pool, config.admin_config_id.clone());

        Self {
            inner: Arc::new(AppStateInner { pool, admin_config }),
        }
    }

    /// Get a reference to the shop database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the admin configuration client.
    #[must_use]
    pub fn admin_config(&self) -> &AdminConfigClient {
        &self.inner.admin_config
    }

    /// Close both database pools.
    ///
    /// Called once the server has stopped accepting requests.
    pub async fn close(&self) {
        self.inner.pool.close().await;
        self.inner.admin_config.close().await;
        tracing::info!("Database pools closed");
    }
}
