use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::tts::VoiceDescriptor;
use crate::errors::AppResult;
use crate::handlers::api::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VoicesQuery {
    /// Locale prefix such as "vi" or "en-US"; empty means no filter
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Voice ID, e.g. "vi-VN-HoaiMyNeural"
    pub name: String,
    pub gender: String,
    pub locale: String,
    pub friendly_name: String,
}

impl From<VoiceDescriptor> for Voice {
    fn from(voice: VoiceDescriptor) -> Self {
        Self {
            name: voice.short_name,
            gender: voice.gender,
            locale: voice.locale,
            friendly_name: voice.friendly_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoicesData {
    pub voices: Vec<Voice>,
    pub total: usize,
}

/// Vietnamese voices omit the locale, which is implied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VietnameseVoice {
    pub name: String,
    pub gender: String,
    pub friendly_name: String,
}

impl From<VoiceDescriptor> for VietnameseVoice {
    fn from(voice: VoiceDescriptor) -> Self {
        Self {
            name: voice.short_name,
            gender: voice.gender,
            friendly_name: voice.friendly_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VietnameseVoicesData {
    pub voices: Vec<VietnameseVoice>,
    /// The configured default voice
    pub default: String,
}

/// Handler for GET /api/voices
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoicesQuery>,
) -> AppResult<Json<ApiResponse<VoicesData>>> {
    let lang = query
        .lang
        .as_deref()
        .map(str::trim)
        .filter(|lang| !lang.is_empty());

    let voices = match lang {
        Some(prefix) => state.speech.list_voices_by_locale_prefix(prefix).await?,
        None => state.speech.list_voices().await?,
    };
    tracing::debug!("Listing {} voices (lang={:?})", voices.len(), lang);

    let voices: Vec<Voice> = voices.into_iter().map(Voice::from).collect();
    Ok(ApiResponse::ok(VoicesData {
        total: voices.len(),
        voices,
    }))
}

/// Handler for GET /api/voices/vietnamese
pub async fn list_vietnamese_voices(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<VietnameseVoicesData>>> {
    let voices = state.speech.list_vietnamese_voices().await?;

    Ok(ApiResponse::ok(VietnameseVoicesData {
        voices: voices.into_iter().map(VietnameseVoice::from).collect(),
        default: state.speech.default_voice().to_string(),
    }))
}
