mod base;
pub mod edge;

use std::sync::Arc;

pub use base::{
    AudioInfo, AudioOutputFormat, AudioStream, BoxedSynthesizer, SpeechSynthesizer,
    SynthesisRequest, TTSError, TTSResult, VoiceDescriptor,
};
pub use edge::{EDGE_TTS_VOICES_URL, EDGE_TTS_WSS_URL, EdgeTTS, EdgeTTSConfig};

/// Factory function to create a speech synthesizer.
///
/// # Supported Providers
///
/// - `"edge"`, `"edge-tts"` or `"microsoft-edge"` - Edge read-aloud voices
///
/// # Example
///
/// ```rust,ignore
/// use edge_speech_gateway::core::tts::{create_synthesizer, EdgeTTSConfig};
///
/// let synthesizer = create_synthesizer("edge", EdgeTTSConfig::default())?;
/// ```
pub fn create_synthesizer(provider_type: &str, config: EdgeTTSConfig) -> TTSResult<BoxedSynthesizer> {
    match provider_type.trim().to_lowercase().as_str() {
        "edge" | "edge-tts" | "edge_tts" | "microsoft-edge" => Ok(Arc::new(EdgeTTS::new(config)?)),
        _ => Err(TTSError::InvalidConfiguration(format!(
            "Unsupported TTS provider: {provider_type}. Supported providers: edge"
        ))),
    }
}
