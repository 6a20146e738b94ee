//! Product route handlers.

use axum::extract::{Path, State};
use tracing::instrument;

use bunny_shop_core::ProductId;

use super::{ApiResponse, ApiResult, parse_id};
use crate::admin_config::DynamicProduct;
use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

/// List every in-stock product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = ProductRepository::new(state.pool()).list_in_stock().await?;
    Ok(ApiResponse::ok(products))
}

/// Show a single product, in stock or not.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let id: ProductId = parse_id(&id)?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    Ok(ApiResponse::ok(product))
}

/// Search in-stock products by name, description or category.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Vec<Product>> {
    let products = ProductRepository::new(state.pool()).search(&query).await?;
    Ok(ApiResponse::ok(products))
}

/// Product feed built from the admin's product cards.
#[instrument(skip(state), fields(admin_id = %state.admin_config().admin_id()))]
pub async fn dynamic(State(state): State<AppState>) -> ApiResult<Vec<DynamicProduct>> {
    let record = state
        .admin_config()
        .fetch()
        .await?
        .ok_or(AppError::ConfigNotFound)?;

    let products = record.document.product_feed();
    tracing::debug!(count = products.len(), "Dynamic product feed built");

    Ok(ApiResponse::ok(products))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};

    use crate::routes::tests::{body_json, send};

    #[tokio::test]
    async fn test_malformed_product_id_is_server_error() {
        let response = send(
            Request::get("/api/products/not-a-number")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid identifier: not-a-number");
    }
}
