use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::Language;
use crate::models::{GeneratedCode, GenerationRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateBody {
    pub prompt: String,
    pub language: Option<String>,
}

/// `POST /generate`
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GeneratedCode>, ApiError> {
    let Json(body) = payload?;

    if body.prompt.trim().is_empty() {
        return Err(ApiError::validation("Prompt is required"));
    }

    let language = match body.language.as_deref() {
        None | Some("") => Language::default(),
        Some(raw) => raw
            .parse::<Language>()
            .map_err(|e| ApiError::validation(e.to_string()))?,
    };

    let generated = state
        .generator
        .generate(&GenerationRequest::new(body.prompt, language))
        .await?;

    Ok(Json(GeneratedCode {
        code: generated.code,
        language: Some(language),
    }))
}
