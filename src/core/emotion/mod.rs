//! Emotion presets for speech synthesis.
//!
//! The synthesis backend has no notion of emotion. This module approximates
//! speaking styles with prosody: each named emotion maps to a pitch, rate and
//! volume adjustment which is rendered into the backend's option strings and
//! merged with whatever the caller sent explicitly.
//!
//! ```text
//!   "cheerful" ──lookup──▶ (10, 10, 5) ──format──▶ {pitch:"+10Hz", rate:"+10%", volume:"+5%"}
//!                                                          │
//!                             caller options {rate:"+50%"} ─┴─merge──▶ {pitch:"+10Hz", rate:"+50%", volume:"+5%"}
//! ```
//!
//! # Example
//!
//! ```rust
//! use edge_speech_gateway::core::emotion::{EmotionPresets, SynthesisOptions, resolve_options};
//!
//! let presets = EmotionPresets::builtin();
//! let mut caller = SynthesisOptions::new();
//! caller.insert("rate", "+50%");
//!
//! let options = resolve_options(&presets, Some("cheerful"), Some(&caller));
//! assert_eq!(options.pitch().as_deref(), Some("+10Hz"));
//! assert_eq!(options.rate().as_deref(), Some("+50%"));
//! ```

pub mod options;
pub mod presets;

pub use options::{
    OUTPUT_FORMAT_KEY, PITCH_KEY, RATE_KEY, SynthesisOptions, VOLUME_KEY, format_pitch,
    format_rate, format_signed, format_volume,
};
pub use presets::{BUILTIN_PRESETS, EmotionPreset, EmotionPresets, NEUTRAL_EMOTION, PresetValues};

/// Looks up `emotion` and merges the caller's overrides on top of it.
///
/// Unknown emotions contribute neutral values, so this never fails.
pub fn resolve_options(
    presets: &EmotionPresets,
    emotion: Option<&str>,
    overrides: Option<&SynthesisOptions>,
) -> SynthesisOptions {
    presets.options_for(emotion).merge_optional(overrides)
}
