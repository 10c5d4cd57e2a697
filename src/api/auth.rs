use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{ApiError, AppState};
use crate::models::User;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub name: String,
}

/// Upserts the user by email and returns it with its latest subscription.
///
/// # Endpoint
/// `POST /auth`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(request) = payload?;
    let user = state.store.upsert_user(&request.email, &request.name).await?;
    info!(user_id = %user.id, "User logged in");
    Ok(Json(user))
}
