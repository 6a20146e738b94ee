//! Seed commands for local development.

use std::path::Path;

use rust_decimal::Decimal;
use sqlx::PgPool;

use bunny_shop_storefront::db;

use super::{CommandError, load_config};

/// Sample catalog: name, price in cents, description, category, in stock.
const SAMPLE_PRODUCTS: &[(&str, i64, &str, &str, bool)] = &[
    ("Classic Cotton Shirt", 1999, "Breathable everyday shirt", "Clothing", true),
    ("Denim Jacket", 4950, "Stonewashed denim with brass buttons", "Clothing", true),
    ("Ceramic Mug", 899, "350ml mug, dishwasher safe", "Kitchen", true),
    ("Bamboo Cutting Board", 1525, "Shirt-pocket sized travel board", "Kitchen", true),
    ("Wireless Earbuds", 5999, "Twelve hour battery life", "Electronics", false),
];

/// Insert the sample catalog if the product table is empty.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn products() -> Result<u64, CommandError> {
    let config = load_config()?;
    let pool = db::create_pool(&config.database_url).await?;

    let inserted = insert_sample_products(&pool).await;
    pool.close().await;
    let inserted = inserted?;

    tracing::info!(inserted, "Product seeding complete");
    Ok(inserted)
}

async fn insert_sample_products(pool: &PgPool) -> Result<u64, CommandError> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.product")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        tracing::warn!(existing, "Product table is not empty, skipping");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for &(name, cents, description, category, in_stock) in SAMPLE_PRODUCTS {
        let result = sqlx::query(
            r"
            INSERT INTO shop.product (name, price, description, category, in_stock)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(name)
        .bind(Decimal::new(cents, 2))
        .bind(description)
        .bind(category)
        .bind(in_stock)
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Upsert an admin document read from a JSON file.
///
/// The document is stored under `admin_id`, or the configured
/// `ADMIN_CONFIG_ID` when none is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON object, or the
/// upsert fails.
pub async fn admin_config(file: &Path, admin_id: Option<String>) -> Result<(), CommandError> {
    let config = load_config()?;
    let admin_id = admin_id.unwrap_or(config.admin_config_id);

    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CommandError::Io {
            path: file.display().to_string(),
            source,
        })?;
    let document = parse_document(&content)?;

    let pool = db::create_pool(&config.main_database_url).await?;
    let result = sqlx::query(
        r"
        INSERT INTO admin_element_screens (user_id, document, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id)
        DO UPDATE SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(&admin_id)
    .bind(&document)
    .execute(&pool)
    .await;
    pool.close().await;
    result?;

    tracing::info!(admin_id = %admin_id, path = %file.display(), "Admin document stored");
    Ok(())
}

/// Parse a file's content into an admin document, which must be an object.
fn parse_document(content: &str) -> Result<serde_json::Value, CommandError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| CommandError::InvalidDocument(e.to_string()))?;

    if !value.is_object() {
        return Err(CommandError::InvalidDocument(
            "expected a JSON object".to_string(),
        ));
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_accepts_object() {
        let value = parse_document(r#"{"shopName": "Acme", "dynamicFields": {}}"#).unwrap();
        assert_eq!(value["shopName"], "Acme");
    }

    #[test]
    fn test_parse_document_rejects_non_object() {
        assert!(matches!(
            parse_document("[1, 2]"),
            Err(CommandError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_document("not json"),
            Err(CommandError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_sample_catalog_has_out_of_stock_item() {
        assert!(SAMPLE_PRODUCTS.iter().any(|&(.., in_stock)| !in_stock));
        assert!(SAMPLE_PRODUCTS.iter().all(|&(_, cents, ..)| cents > 0));
    }
}
