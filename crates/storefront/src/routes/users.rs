//! User registration and lookup handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::instrument;

use bunny_shop_core::UserId;

use super::{ApiResponse, ApiResult, parse_id};
use crate::db::{RepositoryError, UserRepository};
use crate::error::AppError;
use crate::models::{Address, NewUser, User};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Address,
}

impl RegisterRequest {
    /// Check required fields, trimming name and email.
    fn validate(self) -> Result<NewUser, AppError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let phone = self.phone.filter(|p| !p.trim().is_empty());

        Ok(NewUser {
            name,
            email,
            phone,
            address: self.address,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// Register a new user with an empty cart and no orders.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    let new_user = request.validate()?;

    let repo = UserRepository::new(state.pool());

    if repo.email_exists(&new_user.email).await? {
        return Err(AppError::DuplicateUser);
    }

    let user = repo.create(&new_user).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => AppError::DuplicateUser,
        other => AppError::Database(other),
    })?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(ApiResponse::ok(user))
}

/// Show a user together with cart and order history.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let id: UserId = parse_id(&id)?;

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(ApiResponse::ok(user))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };

    use super::*;
    use crate::routes::tests::{body_json, send};

    fn register_request(body: &str) -> Request<Body> {
        Request::post("/api/users/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_validate_trims_and_keeps_address() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "  Ada ",
            "email": "ada@example.com",
            "phone": "",
            "address": { "city": "Pune", "zipCode": "411001" }
        }))
        .unwrap();

        let new_user = request.validate().unwrap();
        assert_eq!(new_user.name, "Ada");
        assert_eq!(new_user.phone, None);
        assert_eq!(new_user.address.city.as_deref(), Some("Pune"));
        assert_eq!(new_user.address.zip_code.as_deref(), Some("411001"));
    }

    #[test]
    fn test_validate_rejects_blank_email() {
        let request: RegisterRequest =
            serde_json::from_value(serde_json::json!({ "name": "A", "email": "   " })).unwrap();

        let err = request.validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "email is required"));
    }

    #[tokio::test]
    async fn test_register_missing_name_is_bad_request() {
        let response = send(register_request(r#"{"email":"a@x.com"}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "error": "name is required" })
        );
    }

    #[tokio::test]
    async fn test_register_malformed_body_is_bad_request() {
        let response = send(register_request("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_user_id_is_server_error() {
        let response = send(Request::get("/api/users/abc").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
