//! Configuration module for the Edge Speech Gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable names and parsing
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use edge_speech_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

use crate::core::emotion::{EmotionPreset, EmotionPresets, NEUTRAL_EMOTION};
use crate::core::speech::DEFAULT_VOICE;
use crate::core::tts::{AudioOutputFormat, EdgeTTSConfig};
use crate::core::tts::{EDGE_TTS_VOICES_URL, EDGE_TTS_WSS_URL};

/// TLS configuration for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port, TLS)
/// - Synthesis defaults (provider, voice, emotion, output format)
/// - Edge endpoints and streaming buffer size
/// - Extra emotion presets
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Synthesis
    pub tts_provider: String,
    pub default_voice: String,
    /// Emotion applied when a request names none
    pub default_emotion: String,
    pub output_format: AudioOutputFormat,
    pub edge_wss_url: String,
    pub edge_voices_url: String,
    /// Audio chunks buffered between the backend and a streaming response
    pub stream_channel_capacity: usize,
    /// Presets added to or replacing the built-in table (YAML only)
    pub emotion_presets: Vec<EmotionPreset>,

    // Security settings
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: String,
    /// Requests per second per IP; 100000 or more disables rate limiting
    pub rate_limit_requests_per_second: u32,
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tls: None,
            tts_provider: "edge".to_string(),
            default_voice: DEFAULT_VOICE.to_string(),
            default_emotion: NEUTRAL_EMOTION.to_string(),
            output_format: AudioOutputFormat::default(),
            edge_wss_url: EDGE_TTS_WSS_URL.to_string(),
            edge_voices_url: EDGE_TTS_VOICES_URL.to_string(),
            stream_channel_capacity: crate::core::tts::edge::DEFAULT_STREAM_CHANNEL_CAPACITY,
            emotion_presets: Vec::new(),
            cors_allowed_origins: "*".to_string(),
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded in `main.rs`, so its values are visible here
    /// as regular environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_default_voice(&self.default_voice)?;
        validation::validate_stream_channel_capacity(self.stream_channel_capacity)?;
        validation::validate_rate_limit(
            self.rate_limit_requests_per_second,
            self.rate_limit_burst_size,
        )?;
        validation::validate_emotion_presets(&self.emotion_presets)?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Edge backend settings derived from this configuration.
    pub fn edge_config(&self) -> EdgeTTSConfig {
        EdgeTTSConfig {
            wss_url: self.edge_wss_url.clone(),
            voices_url: self.edge_voices_url.clone(),
            stream_channel_capacity: self.stream_channel_capacity,
            ..Default::default()
        }
    }

    /// Built-in presets with the configured ones applied.
    pub fn emotion_table(&self) -> EmotionPresets {
        EmotionPresets::with_overrides(self.emotion_presets.iter().cloned())
    }
}
