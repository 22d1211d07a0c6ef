//! Emotion preset table.
//!
//! A preset is a named (pitch, rate, volume) triple. The built-in set covers the
//! speaking styles the service advertises; configuration may append new presets
//! or replace built-in ones, except `neutral`, which is always all zeros.
//!
//! Lookup is exact and case-sensitive. Names that are missing or unknown resolve
//! to the neutral preset, so [`EmotionPresets::lookup`] never fails.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::options::SynthesisOptions;

/// Name of the fallback preset.
pub const NEUTRAL_EMOTION: &str = "neutral";

/// Numeric prosody adjustments of a preset.
///
/// `pitch` is in Hz, `rate` and `volume` are percentages relative to the
/// voice's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresetValues {
    pub pitch: i32,
    pub rate: i32,
    pub volume: i32,
}

impl PresetValues {
    /// The neutral adjustments (no change).
    pub const NEUTRAL: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(pitch: i32, rate: i32, volume: i32) -> Self {
        Self {
            pitch,
            rate,
            volume,
        }
    }
}

/// Built-in presets in advertised order.
pub static BUILTIN_PRESETS: &[(&str, PresetValues)] = &[
    (NEUTRAL_EMOTION, PresetValues::NEUTRAL),
    // Slower, slightly raised pitch
    ("gentle", PresetValues::new(5, -15, -5)),
    // Slow and low, but loud
    ("aggressive", PresetValues::new(-10, -15, 10)),
    ("cheerful", PresetValues::new(10, 10, 5)),
    ("sad", PresetValues::new(-5, -20, -10)),
    ("calm", PresetValues::new(-2, -10, -5)),
    ("excited", PresetValues::new(15, 20, 10)),
];

/// A named preset as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionPreset {
    pub name: String,
    #[serde(flatten)]
    pub values: PresetValues,
}

impl EmotionPreset {
    pub fn new(name: impl Into<String>, values: PresetValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Read-only preset table, built once at startup.
#[derive(Debug, Clone)]
pub struct EmotionPresets {
    presets: Vec<EmotionPreset>,
}

impl Default for EmotionPresets {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EmotionPresets {
    /// Table containing only the built-in presets.
    pub fn builtin() -> Self {
        Self {
            presets: BUILTIN_PRESETS
                .iter()
                .map(|(name, values)| EmotionPreset::new(*name, *values))
                .collect(),
        }
    }

    /// Built-in presets with configured ones applied on top.
    ///
    /// A configured preset whose name matches an existing entry replaces its
    /// values in place; new names are appended in the order given. Entries
    /// named `neutral` are ignored so the fallback stays all zeros.
    pub fn with_overrides<I>(custom: I) -> Self
    where
        I: IntoIterator<Item = EmotionPreset>,
    {
        let mut table = Self::builtin();
        for preset in custom {
            if preset.name == NEUTRAL_EMOTION {
                tracing::warn!("Ignoring configured override of the neutral emotion preset");
                continue;
            }
            match table.presets.iter_mut().find(|p| p.name == preset.name) {
                Some(existing) => existing.values = preset.values,
                None => table.presets.push(preset),
            }
        }
        table
    }

    /// Resolves an emotion name to its values, falling back to neutral.
    pub fn lookup(&self, name: Option<&str>) -> PresetValues {
        name.and_then(|n| self.get(n))
            .map(|preset| preset.values)
            .unwrap_or(PresetValues::NEUTRAL)
    }

    /// Resolves an emotion name straight to formatted synthesis options.
    pub fn options_for(&self, name: Option<&str>) -> SynthesisOptions {
        SynthesisOptions::from_preset(&self.lookup(name))
    }

    pub fn get(&self, name: &str) -> Option<&EmotionPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Preset names in table order.
    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Serializes as `{ "<name>": { "pitch": .., "rate": .., "volume": .. }, .. }`
/// keeping table order.
impl Serialize for EmotionPresets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.presets.len()))?;
        for preset in &self.presets {
            map.serialize_entry(&preset.name, &preset.values)?;
        }
        map.end()
    }
}
