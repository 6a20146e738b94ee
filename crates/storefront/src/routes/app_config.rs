//! App configuration handler.

use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use super::{ApiResponse, ApiResult};
use crate::admin_config::AppConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Store and app configuration derived from the admin document.
#[instrument(skip(state), fields(admin_id = %state.admin_config().admin_id()))]
pub async fn show(State(state): State<AppState>) -> ApiResult<AppConfig> {
    let client = state.admin_config();

    let record = client.fetch().await?.ok_or(AppError::ConfigNotFound)?;
    let config = record
        .document
        .app_config(client.admin_id(), record.updated_at, Utc::now());

    Ok(ApiResponse::ok(config))
}
