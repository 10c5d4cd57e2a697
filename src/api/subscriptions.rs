use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::UserId;
use crate::models::{SubscriptionRecord, User};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GrantRequest {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    pub user_id: Option<UserId>,
    pub is_active: bool,
}

fn require_user_id(user_id: Option<UserId>) -> Result<UserId, ApiError> {
    user_id.ok_or_else(|| ApiError::validation("user_id is required"))
}

/// `GET /subscriptions`
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.store.list_users().await)
}

/// `POST /subscriptions`
pub async fn grant(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Json<SubscriptionRecord>, ApiError> {
    let Json(request) = payload?;
    let user_id = require_user_id(request.user_id)?;
    let record = state
        .store
        .grant(user_id, state.subscription_days)
        .await?;
    Ok(Json(record))
}

/// `PUT /subscriptions`
pub async fn update(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<SubscriptionRecord>, ApiError> {
    let Json(request) = payload?;
    let user_id = require_user_id(request.user_id)?;
    let record = state.store.set_active(user_id, request.is_active).await?;
    Ok(Json(record))
}
