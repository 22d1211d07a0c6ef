use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{emotions, speak, voices};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
///
/// Cross-cutting layers (CORS, rate limiting, security headers) are applied in main.rs.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tts", post(speak::speak_handler))
        .route("/api/tts/audio", post(speak::speak_audio_handler))
        .route("/api/tts/stream", post(speak::speak_stream_handler))
        .route("/api/emotions", get(emotions::list_emotions))
        .route("/api/voices", get(voices::list_voices))
        .route("/api/voices/vietnamese", get(voices::list_vietnamese_voices))
        .layer(TraceLayer::new_for_http())
}
