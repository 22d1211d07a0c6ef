use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::emotion::EmotionPresets;
use crate::core::speech::SpeechService;
use crate::core::tts::{BoxedSynthesizer, TTSResult, create_synthesizer};

/// Application state shared by every handler.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: ServerConfig,
    pub speech: SpeechService,
    pub emotions: EmotionPresets,
}

impl AppState {
    /// Creates the state with the synthesizer named in the configuration.
    pub fn new(config: ServerConfig) -> TTSResult<Arc<Self>> {
        let synthesizer = create_synthesizer(&config.tts_provider, config.edge_config())?;
        info!(
            "Using {} synthesizer with default voice {}",
            synthesizer.provider_name(),
            config.default_voice
        );
        Ok(Self::with_synthesizer(config, synthesizer))
    }

    /// Creates the state around an existing synthesizer.
    pub fn with_synthesizer(config: ServerConfig, synthesizer: BoxedSynthesizer) -> Arc<Self> {
        let emotions = config.emotion_table();
        if !emotions.contains(&config.default_emotion) {
            warn!(
                "Default emotion '{}' is not a known preset; requests without an emotion will sound neutral",
                config.default_emotion
            );
        }

        let speech = SpeechService::new(
            synthesizer,
            config.default_voice.clone(),
            config.output_format,
        );

        Arc::new(Self {
            config,
            speech,
            emotions,
        })
    }
}
