//! Synthesis facade.
//!
//! [`SpeechService`] applies the service defaults (voice and output format),
//! rejects blank text before any backend traffic, and normalises backend
//! failures so callers see one of four outcomes: empty text, no audio, an
//! invalid option, or a voice-annotated synthesis failure.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::emotion::{OUTPUT_FORMAT_KEY, SynthesisOptions};
use crate::core::tts::{
    AudioInfo, AudioOutputFormat, AudioStream, BoxedSynthesizer, SynthesisRequest, TTSError,
    TTSResult, VoiceDescriptor,
};

/// Voice used when a request does not name one.
pub const DEFAULT_VOICE: &str = "vi-VN-HoaiMyNeural";

/// Locale prefix of the Vietnamese voice listing.
pub const VIETNAMESE_LOCALE: &str = "vi-VN";

/// Encoded audio and its metadata.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub audio: Bytes,
    pub info: AudioInfo,
    pub format: AudioOutputFormat,
    pub voice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Base64Audio {
    pub base64: String,
    pub info: AudioInfo,
}

/// Stream of audio chunks plus the format they are encoded in.
pub struct AudioChunkStream {
    pub format: AudioOutputFormat,
    pub voice: String,
    pub chunks: AudioStream,
}

pub struct SpeechService {
    synthesizer: BoxedSynthesizer,
    default_voice: String,
    default_format: AudioOutputFormat,
}

impl SpeechService {
    pub fn new(
        synthesizer: BoxedSynthesizer,
        default_voice: impl Into<String>,
        default_format: AudioOutputFormat,
    ) -> Self {
        Self {
            synthesizer,
            default_voice: default_voice.into(),
            default_format,
        }
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    pub fn default_format(&self) -> AudioOutputFormat {
        self.default_format
    }

    pub fn provider_name(&self) -> &'static str {
        self.synthesizer.provider_name()
    }

    /// Resolves the voice a request will use.
    pub fn resolve_voice<'a>(&'a self, voice: Option<&'a str>) -> &'a str {
        voice
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.default_voice)
    }

    /// Output format requested through options, or the service default.
    pub fn resolve_format(&self, options: &SynthesisOptions) -> TTSResult<AudioOutputFormat> {
        match options.output_format() {
            None | Some(Value::Null) => Ok(self.default_format),
            Some(Value::String(name)) => name.parse(),
            Some(other) => Err(TTSError::InvalidOption {
                name: OUTPUT_FORMAT_KEY.to_string(),
                reason: format!("expected a format name, got {other}"),
            }),
        }
    }

    fn prepare(
        &self,
        text: &str,
        voice: Option<&str>,
        options: &SynthesisOptions,
    ) -> TTSResult<SynthesisRequest> {
        if text.trim().is_empty() {
            return Err(TTSError::EmptyText);
        }
        Ok(SynthesisRequest {
            text: text.to_string(),
            voice: self.resolve_voice(voice).to_string(),
            options: options.clone(),
            output_format: self.resolve_format(options)?,
        })
    }

    /// Synthesizes `text` into a single audio buffer.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        options: &SynthesisOptions,
    ) -> TTSResult<SynthesizedAudio> {
        let request = self.prepare(text, voice, options)?;
        let started = Instant::now();

        let audio = self
            .synthesizer
            .synthesize(&request)
            .await
            .map_err(|e| wrap_failure(&request.voice, e))
            .inspect_err(|e| warn!("Synthesis failed: {e}"))?;

        info!(
            "Synthesized {} chars with {} ({}): {} bytes in {}ms",
            request.text.chars().count(),
            request.voice,
            self.synthesizer.provider_name(),
            audio.len(),
            started.elapsed().as_millis()
        );

        Ok(SynthesizedAudio {
            info: AudioInfo::describe(request.output_format, audio.len()),
            audio,
            format: request.output_format,
            voice: request.voice,
        })
    }

    pub async fn synthesize_to_base64(
        &self,
        text: &str,
        voice: Option<&str>,
        options: &SynthesisOptions,
    ) -> TTSResult<Base64Audio> {
        let synthesized = self.synthesize(text, voice, options).await?;
        Ok(Base64Audio {
            base64: BASE64.encode(&synthesized.audio),
            info: synthesized.info,
        })
    }

    /// Synthesizes and writes the audio to `output_path` with the format's
    /// extension appended. Returns the written path.
    pub async fn synthesize_to_file(
        &self,
        text: &str,
        output_path: impl AsRef<Path>,
        voice: Option<&str>,
        options: &SynthesisOptions,
    ) -> TTSResult<PathBuf> {
        let synthesized = self.synthesize(text, voice, options).await?;

        let mut path = OsString::from(output_path.as_ref().as_os_str());
        path.push(".");
        path.push(synthesized.format.extension());
        let path = PathBuf::from(path);

        tokio::fs::write(&path, &synthesized.audio).await?;
        debug!("Wrote {} bytes to {}", synthesized.audio.len(), path.display());
        Ok(path)
    }

    pub async fn list_voices(&self) -> TTSResult<Vec<VoiceDescriptor>> {
        self.synthesizer.list_voices().await
    }

    /// Voices whose locale equals `prefix` or starts with `prefix-`.
    pub async fn list_voices_by_locale_prefix(
        &self,
        prefix: &str,
    ) -> TTSResult<Vec<VoiceDescriptor>> {
        let voices = self.synthesizer.list_voices().await?;
        Ok(voices
            .into_iter()
            .filter(|voice| voice.matches_locale_prefix(prefix))
            .collect())
    }

    pub async fn list_vietnamese_voices(&self) -> TTSResult<Vec<VoiceDescriptor>> {
        self.list_voices_by_locale_prefix(VIETNAMESE_LOCALE).await
    }

    /// Starts a streaming synthesis. The stream is single-use; dropping it
    /// ends the backend session.
    pub async fn stream_audio(
        &self,
        text: &str,
        voice: Option<&str>,
        options: &SynthesisOptions,
    ) -> TTSResult<AudioChunkStream> {
        let request = self.prepare(text, voice, options)?;
        let voice = request.voice.clone();
        let format = request.output_format;

        let chunks = self
            .synthesizer
            .synthesize_stream(request)
            .await
            .map_err(|e| wrap_failure(&voice, e))?;

        info!("Streaming synthesis started with {voice}");
        let failed_voice = voice.clone();
        let chunks = chunks.map(move |item| item.map_err(|e| wrap_failure(&failed_voice, e)));

        Ok(AudioChunkStream {
            format,
            voice,
            chunks: Box::pin(chunks),
        })
    }
}

/// Annotates backend failures with the voice. Errors that already describe
/// the request pass through unchanged.
fn wrap_failure(voice: &str, error: TTSError) -> TTSError {
    match error {
        e @ (TTSError::EmptyText
        | TTSError::NoAudioReceived { .. }
        | TTSError::InvalidOption { .. }
        | TTSError::SynthesisFailed { .. }) => e,
        other => TTSError::SynthesisFailed {
            voice: voice.to_string(),
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures_util::stream;
    use serde_json::json;

    use super::*;
    use crate::core::tts::SpeechSynthesizer;

    #[derive(Default)]
    struct FakeSynthesizer {
        calls: AtomicUsize,
        fail_with_connection_error: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynthesizer {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_connection_error {
                return Err(TTSError::ConnectionFailed("refused".to_string()));
            }
            if request.voice == "xx-XX-Nobody" {
                return Err(TTSError::NoAudioReceived {
                    voice: request.voice.clone(),
                });
            }
            Ok(Bytes::from(format!("{}|{}", request.voice, request.output_format)))
        }

        async fn synthesize_stream(&self, request: SynthesisRequest) -> TTSResult<AudioStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let chunks = vec![
                Ok(Bytes::from_static(b"one")),
                Ok(Bytes::from(request.voice)),
                Err(TTSError::WebSocketError("reset".to_string())),
            ];
            Ok(Box::pin(stream::iter(chunks)))
        }

        async fn list_voices(&self) -> TTSResult<Vec<VoiceDescriptor>> {
            Ok(["vi-VN", "en-US", "vin-XX"]
                .into_iter()
                .map(|locale| VoiceDescriptor {
                    short_name: format!("{locale}-TestNeural"),
                    gender: "Female".to_string(),
                    locale: locale.to_string(),
                    friendly_name: format!("Test {locale}"),
                })
                .collect())
        }
    }

    fn service(fake: Arc<FakeSynthesizer>) -> SpeechService {
        SpeechService::new(fake, DEFAULT_VOICE, AudioOutputFormat::default())
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_before_backend() {
        let fake = Arc::new(FakeSynthesizer::default());
        let service = service(fake.clone());

        for text in ["", "   ", "\n\t"] {
            let err = service
                .synthesize(text, None, &SynthesisOptions::new())
                .await
                .unwrap_err();
            assert!(matches!(err, TTSError::EmptyText));
        }
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_voice_applied() {
        let service = service(Arc::new(FakeSynthesizer::default()));

        let audio = service
            .synthesize("Xin chào", None, &SynthesisOptions::new())
            .await
            .unwrap();
        assert_eq!(audio.voice, DEFAULT_VOICE);

        let audio = service
            .synthesize("Xin chào", Some("  "), &SynthesisOptions::new())
            .await
            .unwrap();
        assert_eq!(audio.voice, DEFAULT_VOICE);

        let audio = service
            .synthesize("Hello", Some("en-US-AriaNeural"), &SynthesisOptions::new())
            .await
            .unwrap();
        assert_eq!(audio.voice, "en-US-AriaNeural");
    }

    #[tokio::test]
    async fn test_base64_and_info() {
        let service = service(Arc::new(FakeSynthesizer::default()));
        let result = service
            .synthesize_to_base64("Xin chào", None, &SynthesisOptions::new())
            .await
            .unwrap();

        let decoded = BASE64.decode(&result.base64).unwrap();
        assert_eq!(
            decoded,
            b"vi-VN-HoaiMyNeural|audio-24khz-48kbitrate-mono-mp3".to_vec()
        );
        assert_eq!(result.info.size, decoded.len());
        assert_eq!(result.info.mime_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_output_format_option() {
        let service = service(Arc::new(FakeSynthesizer::default()));
        let options: SynthesisOptions =
            serde_json::from_value(json!({"outputFormat": "webm-24khz-16bit-mono-opus"})).unwrap();

        let audio = service.synthesize("Hi", None, &options).await.unwrap();
        assert_eq!(audio.format, AudioOutputFormat::WebmOpus24Khz);
        assert_eq!(audio.info.format, "webm-24khz-16bit-mono-opus");

        let bad: SynthesisOptions = serde_json::from_value(json!({"outputFormat": 42})).unwrap();
        assert!(matches!(
            service.synthesize("Hi", None, &bad).await,
            Err(TTSError::InvalidOption { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_audio_keeps_voice_message() {
        let service = service(Arc::new(FakeSynthesizer::default()));
        let err = service
            .synthesize("Hi", Some("xx-XX-Nobody"), &SynthesisOptions::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate audio. Valid voice? (Requested: xx-XX-Nobody) Valid text?"
        );
    }

    #[tokio::test]
    async fn test_backend_failure_is_wrapped_with_voice() {
        let service = service(Arc::new(FakeSynthesizer {
            fail_with_connection_error: true,
            ..Default::default()
        }));
        let err = service
            .synthesize("Hi", None, &SynthesisOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TTSError::SynthesisFailed { ref voice, .. } if voice == DEFAULT_VOICE));
        assert!(err.to_string().contains("refused"));
    }

    #[tokio::test]
    async fn test_synthesize_to_file_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(FakeSynthesizer::default()));

        let path = service
            .synthesize_to_file("Hi", dir.path().join("sample_output"), None, &SynthesisOptions::new())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("sample_output.mp3"));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, b"vi-VN-HoaiMyNeural|audio-24khz-48kbitrate-mono-mp3".to_vec());
    }

    #[tokio::test]
    async fn test_locale_prefix_filter() {
        let service = service(Arc::new(FakeSynthesizer::default()));

        let voices = service.list_voices_by_locale_prefix("vi").await.unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].locale, "vi-VN");

        assert_eq!(service.list_vietnamese_voices().await.unwrap().len(), 1);
        assert_eq!(service.list_voices().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stream_wraps_item_errors() {
        let service = service(Arc::new(FakeSynthesizer::default()));
        let stream = service
            .stream_audio("Hi", None, &SynthesisOptions::new())
            .await
            .unwrap();
        assert_eq!(stream.voice, DEFAULT_VOICE);

        let items: Vec<_> = stream.chunks.collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), &Bytes::from_static(b"one"));
        assert!(matches!(items[2], Err(TTSError::SynthesisFailed { .. })));
    }

    #[tokio::test]
    async fn test_stream_rejects_blank_text() {
        let fake = Arc::new(FakeSynthesizer::default());
        let service = service(fake.clone());
        assert!(matches!(
            service.stream_audio(" ", None, &SynthesisOptions::new()).await,
            Err(TTSError::EmptyText)
        ));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }
}
