//! Order route handlers.

use axum::extract::{Path, State};
use tracing::instrument;

use bunny_shop_core::{Order, UserId};

use super::{ApiResponse, ApiResult, parse_id};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Place an order from the user's current cart and empty the cart.
///
/// An empty cart yields a zero-total order.
#[instrument(skip(state))]
pub async fn place(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    let user_id: UserId = parse_id(&id)?;

    let order = UserRepository::new(state.pool())
        .place_order(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(ApiResponse::ok(order))
}

/// List the user's orders, oldest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Order>> {
    let user_id: UserId = parse_id(&id)?;

    let orders = UserRepository::new(state.pool())
        .get_orders(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(ApiResponse::ok(orders))
}
