//! Text-to-speech endpoints.
//!
//! All three endpoints take the same body:
//!
//! ```json
//! { "text": "Xin chào", "voice": "vi-VN-HoaiMyNeural", "emotion": "cheerful", "options": { "rate": "+20%" } }
//! ```
//!
//! `voice` and `emotion` fall back to the configured defaults when omitted or
//! empty. The emotion preset is merged under `options`, so explicit options win.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Json, Response},
};
use futures_util::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::core::emotion::{SynthesisOptions, resolve_options};
use crate::core::tts::{AudioInfo, AudioOutputFormat, TTSError};
use crate::errors::{AppError, AppResult};
use crate::handlers::api::ApiResponse;
use crate::state::AppState;

pub const TEXT_REQUIRED_MESSAGE: &str = "Text is required and must be a non-empty string";

/// Request body of the synthesis endpoints.
///
/// `text` stays loosely typed so a non-string value gets the same 400 as a
/// missing one. `voice` and `emotion` are loose too: only `text` is validated.
#[derive(Debug, Default, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub voice: Option<Value>,
    #[serde(default)]
    pub emotion: Option<Value>,
    #[serde(default)]
    pub options: Option<SynthesisOptions>,
}

/// A validated request with defaults applied.
#[derive(Debug, Clone)]
pub struct PreparedSpeech {
    pub text: String,
    pub voice: String,
    /// The emotion as sent, or the configured default
    pub emotion: Value,
    pub options: SynthesisOptions,
}

/// `None`, `null` and `""` mean "not given".
fn is_omitted(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

impl PreparedSpeech {
    pub fn from_request(state: &AppState, request: SpeakRequest) -> AppResult<Self> {
        let text = match request.text {
            Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
            _ => return Err(AppError::Validation(TEXT_REQUIRED_MESSAGE.to_string())),
        };

        // A non-string voice goes to the backend as its JSON text and fails there
        let voice = match request.voice {
            Some(Value::String(voice)) => {
                state.speech.resolve_voice(Some(voice.as_str())).to_string()
            }
            Some(other) if !other.is_null() => other.to_string(),
            _ => state.speech.default_voice().to_string(),
        };

        // Names are matched exactly; a non-string emotion is simply unknown
        let emotion = if is_omitted(&request.emotion) {
            Value::String(state.config.default_emotion.clone())
        } else {
            request.emotion.unwrap_or_default()
        };
        let options = resolve_options(&state.emotions, emotion.as_str(), request.options.as_ref());

        Ok(Self {
            text,
            voice,
            emotion,
            options,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakInfo {
    #[serde(flatten)]
    pub audio: AudioInfo,
    pub generation_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SpeakData {
    pub base64: String,
    pub text: String,
    pub voice: String,
    pub emotion: Value,
    pub options: SynthesisOptions,
    pub info: SpeakInfo,
}

/// Handler for POST /api/tts
///
/// Returns the audio as base64 inside the JSON envelope.
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<SpeakData>>> {
    let Json(request) = payload?;
    let prepared = PreparedSpeech::from_request(&state, request)?;
    let started = Instant::now();

    let result = state
        .speech
        .synthesize_to_base64(&prepared.text, Some(&prepared.voice), &prepared.options)
        .await?;

    let generation_time_ms = started.elapsed().as_millis() as u64;
    info!(
        "POST /api/tts: voice={}, emotion={}, {} bytes in {}ms",
        prepared.voice, prepared.emotion, result.info.size, generation_time_ms
    );

    Ok(ApiResponse::ok(SpeakData {
        base64: result.base64,
        text: prepared.text,
        voice: prepared.voice,
        emotion: prepared.emotion,
        options: prepared.options,
        info: SpeakInfo {
            audio: result.info,
            generation_time_ms,
        },
    }))
}

fn audio_headers(format: AudioOutputFormat) -> [(header::HeaderName, String); 2] {
    [
        (header::CONTENT_TYPE, format.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"speech.{}\"", format.extension()),
        ),
    ]
}

/// Handler for POST /api/tts/audio
///
/// Returns the raw audio so browsers and API clients can play it directly.
pub async fn speak_audio_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let prepared = PreparedSpeech::from_request(&state, request)?;

    let synthesized = state
        .speech
        .synthesize(&prepared.text, Some(&prepared.voice), &prepared.options)
        .await?;

    debug!(
        "POST /api/tts/audio: voice={}, {} bytes",
        synthesized.voice,
        synthesized.audio.len()
    );

    Ok((audio_headers(synthesized.format), synthesized.audio).into_response())
}

/// Handler for POST /api/tts/stream
///
/// Streams audio chunks as the backend produces them. Failures before the
/// first chunk are reported as JSON errors; later failures end the body early.
pub async fn speak_stream_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let prepared = PreparedSpeech::from_request(&state, request)?;

    let audio = state
        .speech
        .stream_audio(&prepared.text, Some(&prepared.voice), &prepared.options)
        .await?;

    let mut chunks = audio.chunks;
    let first = match chunks.next().await {
        Some(Ok(chunk)) => chunk,
        Some(Err(e)) => return Err(e.into()),
        None => {
            return Err(TTSError::NoAudioReceived {
                voice: audio.voice,
            }
            .into());
        }
    };

    let voice = audio.voice;
    let body = stream::once(async move { Ok::<_, TTSError>(first) })
        .chain(chunks)
        .inspect(move |item| {
            if let Err(e) = item {
                error!("Audio stream for {voice} ended early: {e}");
            }
        });

    Ok((audio_headers(audio.format), Body::from_stream(body)).into_response())
}
