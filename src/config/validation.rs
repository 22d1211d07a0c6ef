//! Configuration validation.

use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;

use super::TlsConfig;
use crate::core::emotion::{EmotionPreset, NEUTRAL_EMOTION};

pub fn validate_default_voice(voice: &str) -> Result<(), Box<dyn Error>> {
    if voice.trim().is_empty() {
        return Err("default_voice must not be empty".into());
    }
    Ok(())
}

pub fn validate_stream_channel_capacity(capacity: usize) -> Result<(), Box<dyn Error>> {
    if capacity == 0 {
        return Err("stream_channel_capacity must be greater than 0".into());
    }
    Ok(())
}

/// The rate limiter rejects a zero period or burst.
pub fn validate_rate_limit(
    requests_per_second: u32,
    burst_size: u32,
) -> Result<(), Box<dyn Error>> {
    if requests_per_second == 0 {
        return Err("rate_limit_requests_per_second must be greater than 0".into());
    }
    if burst_size == 0 {
        return Err("rate_limit_burst_size must be greater than 0".into());
    }
    Ok(())
}

/// Preset names must be non-empty and unique, and `neutral` cannot be redefined.
pub fn validate_emotion_presets(presets: &[EmotionPreset]) -> Result<(), Box<dyn Error>> {
    let mut seen = HashSet::new();
    for preset in presets {
        let name = preset.name.trim();
        if name.is_empty() {
            return Err("Emotion preset names must not be empty".into());
        }
        if name != preset.name {
            return Err(format!(
                "Emotion preset name '{}' has leading or trailing whitespace",
                preset.name
            )
            .into());
        }
        if name == NEUTRAL_EMOTION {
            return Err(format!("The '{NEUTRAL_EMOTION}' emotion preset cannot be overridden").into());
        }
        if !seen.insert(name) {
            return Err(format!("Duplicate emotion preset '{name}'").into());
        }
    }
    Ok(())
}

/// Both paths or neither.
pub fn validate_tls_paths(
    cert_path: Option<String>,
    key_path: Option<String>,
) -> Result<Option<TlsConfig>, Box<dyn Error>> {
    match (cert_path, key_path) {
        (Some(cert), Some(key)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err("TLS certificate path is set but the key path is missing".into()),
        (None, Some(_)) => Err("TLS key path is set but the certificate path is missing".into()),
    }
}
