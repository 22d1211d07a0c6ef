use serde::Deserialize;
use std::path::PathBuf;

use crate::core::emotion::EmotionPreset;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// here override the environment.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///   tls:
///     cert_path: "/etc/ssl/gateway.pem"
///     key_path: "/etc/ssl/gateway.key"
///
/// tts:
///   provider: "edge"
///   default_voice: "vi-VN-HoaiMyNeural"
///   default_emotion: "neutral"
///   output_format: "audio-24khz-48kbitrate-mono-mp3"
///   stream_channel_capacity: 32
///   edge:
///     wss_url: "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1"
///     voices_url: "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/voices/list"
///
/// emotions:
///   - name: "whisper"
///     pitch: -3
///     rate: -10
///     volume: -30
///
/// security:
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub tts: Option<TtsYaml>,
    pub emotions: Vec<EmotionPreset>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    /// Set to false to ignore the paths below
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Synthesis settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub provider: Option<String>,
    pub default_voice: Option<String>,
    pub default_emotion: Option<String>,
    pub output_format: Option<String>,
    /// Audio chunks buffered per streaming response
    pub stream_channel_capacity: Option<usize>,
    pub edge: Option<EdgeYaml>,
}

/// Edge endpoint overrides from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EdgeYaml {
    pub wss_url: Option<String>,
    pub voices_url: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
