//! Synthesis option formatting and merging.
//!
//! The synthesis backend takes prosody adjustments as signed strings:
//! pitch in Hz (`"+5Hz"`) and rate/volume as percentages (`"-15%"`).
//! Callers may send any other keys alongside; they are carried through
//! untouched so the backend can interpret them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::presets::PresetValues;

pub const PITCH_KEY: &str = "pitch";
pub const RATE_KEY: &str = "rate";
pub const VOLUME_KEY: &str = "volume";
/// Per-request override of the backend audio format.
pub const OUTPUT_FORMAT_KEY: &str = "outputFormat";

/// Renders a value with an explicit sign: `+` for zero and positive values.
pub fn format_signed(value: i32, unit: &str) -> String {
    if value >= 0 {
        format!("+{value}{unit}")
    } else {
        format!("{value}{unit}")
    }
}

#[inline]
pub fn format_pitch(pitch: i32) -> String {
    format_signed(pitch, "Hz")
}

#[inline]
pub fn format_rate(rate: i32) -> String {
    format_signed(rate, "%")
}

#[inline]
pub fn format_volume(volume: i32) -> String {
    format_signed(volume, "%")
}

/// Options handed to the synthesizer, as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynthesisOptions(Map<String, Value>);

impl SynthesisOptions {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Formats a preset into `{pitch, rate, volume}` strings.
    pub fn from_preset(values: &PresetValues) -> Self {
        let mut options = Map::with_capacity(3);
        options.insert(PITCH_KEY.into(), Value::String(format_pitch(values.pitch)));
        options.insert(RATE_KEY.into(), Value::String(format_rate(values.rate)));
        options.insert(
            VOLUME_KEY.into(),
            Value::String(format_volume(values.volume)),
        );
        Self(options)
    }

    /// Shallow merge: every key in `overrides` replaces or extends `self`.
    pub fn merge(&self, overrides: &SynthesisOptions) -> SynthesisOptions {
        let mut merged = self.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// Like [`merge`](Self::merge) for an optional caller object.
    pub fn merge_optional(&self, overrides: Option<&SynthesisOptions>) -> SynthesisOptions {
        match overrides {
            Some(overrides) => self.merge(overrides),
            None => self.clone(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a value rendered as text. Strings are returned as-is and numbers
    /// are stringified; other JSON types yield `None`.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn pitch(&self) -> Option<String> {
        self.get_text(PITCH_KEY)
    }

    pub fn rate(&self) -> Option<String> {
        self.get_text(RATE_KEY)
    }

    pub fn volume(&self) -> Option<String> {
        self.get_text(VOLUME_KEY)
    }

    pub fn output_format(&self) -> Option<&Value> {
        self.0.get(OUTPUT_FORMAT_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for SynthesisOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_signed_examples() {
        assert_eq!(format_pitch(5), "+5Hz");
        assert_eq!(format_rate(-15), "-15%");
        assert_eq!(format_volume(0), "+0%");
    }

    #[test]
    fn test_format_signed_sign_follows_input() {
        for value in [-100, -20, -1] {
            assert!(format_rate(value).starts_with('-'));
            assert!(!format_rate(value).starts_with("--"));
        }
        for value in [0, 1, 15, 100] {
            assert!(format_pitch(value).starts_with('+'));
        }
        assert_eq!(format_signed(i32::MIN, "%"), "-2147483648%");
    }

    #[test]
    fn test_from_preset() {
        let options = SynthesisOptions::from_preset(&PresetValues::new(10, 10, 5));
        assert_eq!(options.pitch().as_deref(), Some("+10Hz"));
        assert_eq!(options.rate().as_deref(), Some("+10%"));
        assert_eq!(options.volume().as_deref(), Some("+5%"));
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let preset = SynthesisOptions::from_preset(&PresetValues::new(5, -15, -5));
        assert_eq!(preset.merge(&SynthesisOptions::new()), preset);
        assert_eq!(preset.merge_optional(None), preset);
    }

    #[test]
    fn test_merge_overrides_only_given_keys() {
        let preset = SynthesisOptions::from_preset(&PresetValues::new(5, -15, -5));
        let mut caller = SynthesisOptions::new();
        caller.insert("rate", "+50%");

        let merged = preset.merge(&caller);
        assert_eq!(merged.rate().as_deref(), Some("+50%"));
        assert_eq!(merged.pitch().as_deref(), Some("+5Hz"));
        assert_eq!(merged.volume().as_deref(), Some("-5%"));
    }

    #[test]
    fn test_merge_passes_through_extra_keys() {
        let preset = SynthesisOptions::from_preset(&PresetValues::NEUTRAL);
        let caller: SynthesisOptions =
            serde_json::from_value(json!({"outputFormat": "webm-24khz-16bit-mono-opus", "custom": 1}))
                .unwrap();

        let merged = preset.merge(&caller);
        assert_eq!(merged.len(), 5);
        assert_eq!(merged.get("custom"), Some(&json!(1)));
        assert_eq!(
            merged.output_format(),
            Some(&json!("webm-24khz-16bit-mono-opus"))
        );
    }

    #[test]
    fn test_get_text_stringifies_numbers() {
        let options: SynthesisOptions =
            serde_json::from_value(json!({"rate": 1.5, "pitch": null, "volume": true})).unwrap();
        assert_eq!(options.rate().as_deref(), Some("1.5"));
        assert_eq!(options.pitch(), None);
        assert_eq!(options.volume(), None);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let options = SynthesisOptions::from_preset(&PresetValues::new(-2, -10, -5));
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"pitch": "-2Hz", "rate": "-10%", "volume": "-5%"})
        );
    }
}
