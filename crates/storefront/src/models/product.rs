//! Catalog product.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bunny_shop_core::{Price, ProductId};

/// A product row from `shop.product`.
///
/// Products are created by seeding tooling and never modified through the
/// API.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}
