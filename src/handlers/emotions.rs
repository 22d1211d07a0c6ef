use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::core::emotion::EmotionPresets;
use crate::handlers::api::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EmotionsData {
    /// Preset names in table order
    pub emotions: Vec<String>,
    pub presets: EmotionPresets,
}

/// Handler for GET /api/emotions
pub async fn list_emotions(State(state): State<Arc<AppState>>) -> Json<ApiResponse<EmotionsData>> {
    ApiResponse::ok(EmotionsData {
        emotions: state
            .emotions
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        presets: state.emotions.clone(),
    })
}
