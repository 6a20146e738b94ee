//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use bunny_shop_core::{CartLine, NewCartLine, Price, UserId};

use super::{ApiResponse, ApiResult, parse_id};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub name: String,
    pub price: Price,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Accept product ids sent either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

impl From<AddToCartRequest> for NewCartLine {
    fn from(request: AddToCartRequest) -> Self {
        Self {
            product_id: request.product_id,
            name: request.name,
            price: request.price,
            quantity: request.quantity,
        }
    }
}

/// Show the user's cart lines in insertion order.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<CartLine>> {
    let user_id: UserId = parse_id(&id)?;

    let cart = UserRepository::new(state.pool())
        .get_cart(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(ApiResponse::ok(cart.into_lines()))
}

/// Add a product to the cart, merging quantities for a product already
/// present. Returns the whole cart.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> ApiResult<Vec<CartLine>> {
    let user_id: UserId = parse_id(&id)?;
    let Json(request) = payload?;

    let cart = UserRepository::new(state.pool())
        .add_to_cart(user_id, request.into())
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(ApiResponse::ok(cart.into_lines()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use rust_decimal::Decimal;

    use super::*;
    use crate::routes::tests::send;

    #[test]
    fn test_request_defaults_quantity_to_one() {
        let request: AddToCartRequest = serde_json::from_value(serde_json::json!({
            "productId": "p1",
            "name": "Shirt",
            "price": 10
        }))
        .unwrap();

        assert_eq!(request.quantity, 1);
        assert_eq!(request.price.amount(), Decimal::from(10));
    }

    #[test]
    fn test_request_accepts_numeric_product_id() {
        let request: AddToCartRequest = serde_json::from_value(serde_json::json!({
            "productId": 7,
            "name": "Mug",
            "price": 4.5,
            "quantity": 3
        }))
        .unwrap();

        let line = NewCartLine::from(request);
        assert_eq!(line.product_id, "7");
        assert_eq!(line.quantity, 3);
    }

    #[tokio::test]
    async fn test_add_with_malformed_user_id_is_server_error() {
        let response = send(
            Request::post("/api/users/xyz/cart")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"productId":"p1","name":"Shirt","price":10}"#,
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
