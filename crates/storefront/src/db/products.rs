//! Product repository for catalog reads.

use sqlx::PgPool;
use tracing::instrument;

use bunny_shop_core::ProductId;

use super::{RepositoryError, contains_pattern};
use crate::models::Product;

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product that is in stock, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_in_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description, image, category, in_stock, created_at
            FROM shop.product
            WHERE in_stock
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID, regardless of stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description, image, category, in_stock, created_at
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Search in-stock products whose name, description or category
    /// contains `query`, ignoring case.
    ///
    /// The query is matched literally; an empty query returns every in-stock
    /// product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = contains_pattern(query);

        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description, image, category, in_stock, created_at
            FROM shop.product
            WHERE in_stock
              AND (name ILIKE $1 OR description ILIKE $1 OR category ILIKE $1)
            ORDER BY id
            ",
        )
        .bind(&pattern)
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(count = products.len(), "Product search complete");
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::db::create_pool;

    const OUT_OF_STOCK_SAMPLE: &str = "Wireless Earbuds";

    async fn seeded_pool() -> PgPool {
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("STOREFRONT_DATABASE_URL must point at a migrated, seeded database");
        create_pool(&SecretString::from(url)).await.unwrap()
    }

    fn ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[tokio::test]
    #[ignore = "Requires a migrated database seeded with `bunny-cli seed products`"]
    async fn test_empty_search_equals_in_stock_listing() {
        let pool = seeded_pool().await;
        let repo = ProductRepository::new(&pool);

        let listed = repo.list_in_stock().await.unwrap();
        let searched = repo.search("").await.unwrap();

        assert!(!listed.is_empty());
        assert_eq!(ids(&searched), ids(&listed));
    }

    #[tokio::test]
    #[ignore = "Requires a migrated database seeded with `bunny-cli seed products`"]
    async fn test_out_of_stock_products_are_never_listed() {
        let pool = seeded_pool().await;
        let repo = ProductRepository::new(&pool);

        let listed = repo.list_in_stock().await.unwrap();
        let searched = repo.search("earbuds").await.unwrap();

        assert!(listed.iter().all(|p| p.in_stock));
        assert!(listed.iter().all(|p| p.name != OUT_OF_STOCK_SAMPLE));
        assert!(searched.is_empty());
    }

    #[tokio::test]
    #[ignore = "Requires a migrated database seeded with `bunny-cli seed products`"]
    async fn test_search_is_case_insensitive_across_fields() {
        let pool = seeded_pool().await;
        let repo = ProductRepository::new(&pool);

        let names: Vec<String> = repo
            .search("SHIRT")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        // Matched by name and by description respectively
        assert!(names.iter().any(|n| n == "Classic Cotton Shirt"));
        assert!(names.iter().any(|n| n == "Bamboo Cutting Board"));
    }
}
