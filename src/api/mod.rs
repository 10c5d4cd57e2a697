//! Mock backend speaking the auth, subscriptions and generate wire formats.

use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{CodeGenerator, MockCodeGenerator};
use crate::store::Store;

pub mod auth;
mod error;
pub mod generate;
pub mod subscriptions;

pub use error::{ApiError, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    pub generator: Arc<dyn CodeGenerator>,

    pub subscription_days: i64,

    pub cors_allowed_origins: Vec<String>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store, generator: Arc<dyn CodeGenerator>, config: &Config) -> Self {
        Self {
            store,
            generator,
            subscription_days: config.server.subscription_days,
            cors_allowed_origins: config.server.cors_allowed_origins.clone(),
        }
    }
}

#[must_use]
pub fn create_app_state_from_config(config: &Config) -> Arc<AppState> {
    let store = Store::with_admins(&config.server.admin_emails);
    let generator = Arc::new(MockCodeGenerator::new(config.generation.mock_delay()));
    Arc::new(AppState::new(store, generator, config))
}

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

async fn health() -> Json<HealthLiveResponse> {
    Json(HealthLiveResponse { status: "ok" })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route(
            "/auth",
            post(auth::login).fallback(error::method_not_allowed),
        )
        .route(
            "/subscriptions",
            get(subscriptions::list_users)
                .post(subscriptions::grant)
                .put(subscriptions::update)
                .fallback(error::method_not_allowed),
        )
        .route(
            "/generate",
            post(generate::generate).fallback(error::method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
