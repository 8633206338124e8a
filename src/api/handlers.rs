use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{ChatTurn, RecommendationResult, UserProfile},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub message: String,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Handler for the recommendation endpoint
///
/// The engine itself never fails, so a well-formed request always gets a
/// 200 with a complete result; only an empty message is rejected.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendationResult>> {
    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput("Message cannot be empty".to_string()));
    }

    let result = state
        .engine
        .generate(&request.message, &request.profile, &request.history)
        .await;

    Ok(Json(result))
}
