//! Database migration commands.
//!
//! Shop migrations live in `crates/storefront/migrations/`, the admin config
//! table in `crates/storefront/migrations_main/`. Both are embedded at build
//! time.

use bunny_shop_storefront::db;

use super::{CommandError, load_config};

/// Run shop database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    let config = load_config()?;

    tracing::info!("Connecting to shop database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;
    pool.close().await;

    tracing::info!("Shop migrations complete");
    Ok(())
}

/// Run app-builder database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn main_db() -> Result<(), CommandError> {
    let config = load_config()?;

    tracing::info!("Connecting to main database...");
    let pool = db::create_pool(&config.main_database_url).await?;

    tracing::info!("Running main database migrations...");
    sqlx::migrate!("../storefront/migrations_main")
        .run(&pool)
        .await?;
    pool.close().await;

    tracing::info!("Main database migrations complete");
    Ok(())
}
