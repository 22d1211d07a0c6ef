//! Provider-agnostic synthesis types.
//!
//! Everything above this module (the speech facade and the HTTP handlers) talks
//! to a [`SpeechSynthesizer`] and never to a concrete backend.

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::emotion::SynthesisOptions;

/// Errors produced while synthesizing speech or listing voices.
#[derive(Debug, Error)]
pub enum TTSError {
    #[error("Text is required and must be a non-empty string")]
    EmptyText,

    #[error("Failed to generate audio. Valid voice? (Requested: {voice}) Valid text?")]
    NoAudioReceived { voice: String },

    #[error("Invalid synthesis option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Failed to list voices: {0}")]
    VoiceListFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TTS synthesis failed (voice: {voice}): {source}")]
    SynthesisFailed {
        voice: String,
        #[source]
        source: Box<TTSError>,
    },
}

impl TTSError {
    /// Whether the error was caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TTSError::EmptyText)
    }
}

pub type TTSResult<T> = Result<T, TTSError>;

/// Audio formats understood by the synthesis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioOutputFormat {
    #[default]
    Mp3_24Khz48Kbps,
    Mp3_24Khz96Kbps,
    Mp3_48Khz96Kbps,
    Mp3_48Khz192Kbps,
    WebmOpus24Khz,
    OggOpus24Khz,
    RiffPcm24Khz,
    RawPcm24Khz,
}

impl AudioOutputFormat {
    pub const ALL: [AudioOutputFormat; 8] = [
        Self::Mp3_24Khz48Kbps,
        Self::Mp3_24Khz96Kbps,
        Self::Mp3_48Khz96Kbps,
        Self::Mp3_48Khz192Kbps,
        Self::WebmOpus24Khz,
        Self::OggOpus24Khz,
        Self::RiffPcm24Khz,
        Self::RawPcm24Khz,
    ];

    /// Wire name of the format.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3_24Khz48Kbps => "audio-24khz-48kbitrate-mono-mp3",
            Self::Mp3_24Khz96Kbps => "audio-24khz-96kbitrate-mono-mp3",
            Self::Mp3_48Khz96Kbps => "audio-48khz-96kbitrate-mono-mp3",
            Self::Mp3_48Khz192Kbps => "audio-48khz-192kbitrate-mono-mp3",
            Self::WebmOpus24Khz => "webm-24khz-16bit-mono-opus",
            Self::OggOpus24Khz => "ogg-24khz-16bit-mono-opus",
            Self::RiffPcm24Khz => "riff-24khz-16bit-mono-pcm",
            Self::RawPcm24Khz => "raw-24khz-16bit-mono-pcm",
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3_24Khz48Kbps
            | Self::Mp3_24Khz96Kbps
            | Self::Mp3_48Khz96Kbps
            | Self::Mp3_48Khz192Kbps => "mp3",
            Self::WebmOpus24Khz => "webm",
            Self::OggOpus24Khz => "ogg",
            Self::RiffPcm24Khz => "wav",
            Self::RawPcm24Khz => "pcm",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3_24Khz48Kbps
            | Self::Mp3_24Khz96Kbps
            | Self::Mp3_48Khz96Kbps
            | Self::Mp3_48Khz192Kbps => "audio/mpeg",
            Self::WebmOpus24Khz => "audio/webm",
            Self::OggOpus24Khz => "audio/ogg",
            Self::RiffPcm24Khz => "audio/wav",
            Self::RawPcm24Khz => "audio/L16",
        }
    }

    pub const fn sample_rate(&self) -> u32 {
        match self {
            Self::Mp3_48Khz96Kbps | Self::Mp3_48Khz192Kbps => 48000,
            _ => 24000,
        }
    }

    /// Constant bitrate in kbit/s, when the format has one.
    pub const fn bitrate_kbps(&self) -> Option<u32> {
        match self {
            Self::Mp3_24Khz48Kbps => Some(48),
            Self::Mp3_24Khz96Kbps | Self::Mp3_48Khz96Kbps => Some(96),
            Self::Mp3_48Khz192Kbps => Some(192),
            // 16-bit mono PCM
            Self::RiffPcm24Khz | Self::RawPcm24Khz => Some(384),
            Self::WebmOpus24Khz | Self::OggOpus24Khz => None,
        }
    }

    /// Estimated playback duration in seconds for `size` bytes of audio.
    pub fn estimate_duration_secs(&self, size: usize) -> Option<f64> {
        let kbps = self.bitrate_kbps()?;
        let secs = (size as f64 * 8.0) / (kbps as f64 * 1000.0);
        Some((secs * 100.0).round() / 100.0)
    }
}

impl fmt::Display for AudioOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioOutputFormat {
    type Err = TTSError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| TTSError::InvalidOption {
                name: "outputFormat".to_string(),
                reason: format!(
                    "unsupported format '{s}'. Supported formats: {}",
                    Self::ALL.map(|f| f.as_str()).join(", ")
                ),
            })
    }
}

/// A single synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    pub options: SynthesisOptions,
    pub output_format: AudioOutputFormat,
}

/// Metadata describing synthesized audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInfo {
    pub format: String,
    pub mime_type: String,
    /// Size in bytes
    pub size: usize,
    pub sample_rate: u32,
    /// Seconds, when derivable from the format's bitrate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<f64>,
}

impl AudioInfo {
    pub fn describe(format: AudioOutputFormat, size: usize) -> Self {
        Self {
            format: format.as_str().to_string(),
            mime_type: format.mime_type().to_string(),
            size,
            sample_rate: format.sample_rate(),
            estimated_duration: format.estimate_duration_secs(size),
        }
    }
}

/// A voice as published by the synthesis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceDescriptor {
    /// Voice identifier, e.g. "vi-VN-HoaiMyNeural"
    pub short_name: String,
    /// "Female" or "Male"
    pub gender: String,
    /// Locale code, e.g. "vi-VN"
    pub locale: String,
    /// Human readable name
    pub friendly_name: String,
}

impl VoiceDescriptor {
    /// True when the locale equals `prefix` or is a sub-tag of it
    /// (`"vi"` matches `"vi"` and `"vi-VN"` but not `"vin"`).
    pub fn matches_locale_prefix(&self, prefix: &str) -> bool {
        self.locale == prefix
            || self
                .locale
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

/// Lazily produced audio chunks; ends when the backend finishes the turn.
pub type AudioStream = Pin<Box<dyn Stream<Item = TTSResult<Bytes>> + Send>>;

/// A speech synthesis backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short provider identifier used in logs.
    fn provider_name(&self) -> &'static str;

    /// Synthesizes the whole request and returns the encoded audio.
    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes>;

    /// Starts a synthesis and yields chunks as they arrive.
    ///
    /// Dropping the stream abandons the synthesis.
    async fn synthesize_stream(&self, request: SynthesisRequest) -> TTSResult<AudioStream>;

    /// Lists every voice the backend offers.
    async fn list_voices(&self) -> TTSResult<Vec<VoiceDescriptor>>;
}

pub type BoxedSynthesizer = Arc<dyn SpeechSynthesizer>;

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(locale: &str) -> VoiceDescriptor {
        VoiceDescriptor {
            short_name: format!("{locale}-TestNeural"),
            gender: "Female".to_string(),
            locale: locale.to_string(),
            friendly_name: "Test".to_string(),
        }
    }

    #[test]
    fn test_locale_prefix_matching() {
        assert!(voice("vi-VN").matches_locale_prefix("vi"));
        assert!(voice("vi-VN").matches_locale_prefix("vi-VN"));
        assert!(voice("vi").matches_locale_prefix("vi"));
        assert!(!voice("vin-XX").matches_locale_prefix("vi"));
        assert!(!voice("en-US").matches_locale_prefix("vi"));
        assert!(!voice("vi-VN").matches_locale_prefix("VI"));
    }

    #[test]
    fn test_voice_descriptor_deserializes_backend_shape() {
        let json = r#"{
            "Name": "Microsoft Server Speech Text to Speech Voice (vi-VN, HoaiMyNeural)",
            "ShortName": "vi-VN-HoaiMyNeural",
            "Gender": "Female",
            "Locale": "vi-VN",
            "SuggestedCodec": "audio-24khz-48kbitrate-mono-mp3",
            "FriendlyName": "Microsoft HoaiMy Online (Natural) - Vietnamese (Vietnam)",
            "Status": "GA"
        }"#;
        let voice: VoiceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(voice.short_name, "vi-VN-HoaiMyNeural");
        assert_eq!(voice.gender, "Female");
        assert_eq!(voice.locale, "vi-VN");
        assert!(voice.friendly_name.starts_with("Microsoft HoaiMy"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(
            "audio-24khz-48kbitrate-mono-mp3"
                .parse::<AudioOutputFormat>()
                .unwrap(),
            AudioOutputFormat::Mp3_24Khz48Kbps
        );
        assert_eq!(
            " WEBM-24khz-16bit-mono-opus ".parse::<AudioOutputFormat>().unwrap(),
            AudioOutputFormat::WebmOpus24Khz
        );
        let err = "flac".parse::<AudioOutputFormat>().unwrap_err();
        assert!(matches!(err, TTSError::InvalidOption { .. }));
        assert!(err.to_string().contains("audio-24khz-48kbitrate-mono-mp3"));
    }

    #[test]
    fn test_output_format_round_trips_wire_names() {
        for format in AudioOutputFormat::ALL {
            assert_eq!(format.as_str().parse::<AudioOutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_default_format_is_mp3() {
        let format = AudioOutputFormat::default();
        assert_eq!(format.extension(), "mp3");
        assert_eq!(format.mime_type(), "audio/mpeg");
        assert_eq!(format.sample_rate(), 24000);
    }

    #[test]
    fn test_audio_info_duration_estimate() {
        // 48 kbit/s -> 6000 bytes per second
        let info = AudioInfo::describe(AudioOutputFormat::Mp3_24Khz48Kbps, 12_000);
        assert_eq!(info.estimated_duration, Some(2.0));
        assert_eq!(info.size, 12_000);

        let opus = AudioInfo::describe(AudioOutputFormat::OggOpus24Khz, 12_000);
        assert_eq!(opus.estimated_duration, None);
        let json = serde_json::to_value(&opus).unwrap();
        assert!(json.get("estimatedDuration").is_none());
        assert_eq!(json["mimeType"], "audio/ogg");
    }

    #[test]
    fn test_error_messages() {
        let err = TTSError::NoAudioReceived {
            voice: "xx-XX-Nobody".to_string(),
        };
        assert!(err.to_string().contains("xx-XX-Nobody"));

        let wrapped = TTSError::SynthesisFailed {
            voice: "vi-VN-HoaiMyNeural".to_string(),
            source: Box::new(TTSError::ConnectionFailed("refused".to_string())),
        };
        assert_eq!(
            wrapped.to_string(),
            "TTS synthesis failed (voice: vi-VN-HoaiMyNeural): Connection failed: refused"
        );
        assert!(TTSError::EmptyText.is_client_error());
        assert!(!wrapped.is_client_error());
    }
}
