pub mod emotion;
pub mod speech;
pub mod tts;

// Re-export commonly used types for convenience
pub use emotion::{EmotionPreset, EmotionPresets, PresetValues, SynthesisOptions, resolve_options};
pub use speech::{AudioChunkStream, Base64Audio, DEFAULT_VOICE, SpeechService, SynthesizedAudio};
pub use tts::{
    AudioInfo, AudioOutputFormat, BoxedSynthesizer, EdgeTTS, EdgeTTSConfig, SpeechSynthesizer,
    TTSError, TTSResult, VoiceDescriptor, create_synthesizer,
};
