use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::tts::TTSError;

/// Errors returned by HTTP handlers.
///
/// Rendered as `{"success": false, "error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request is malformed or missing required fields.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Synthesis(#[from] TTSError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Synthesis(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Synthesis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Request failed: {message}");
        } else {
            warn!("Rejected request: {message}");
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": message,
            })),
        )
            .into_response()
    }
}
