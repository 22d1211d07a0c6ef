//! Builds a [`ServerConfig`] from environment variables with optional YAML overrides.

use std::error::Error;

use super::env::{self, parse_var, var};
use super::yaml::YamlConfig;
use super::{ServerConfig, validation};
use crate::core::tts::AudioOutputFormat;

/// Priority: YAML > environment > defaults.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn Error>> {
    let yaml = yaml.unwrap_or_default();
    let defaults = ServerConfig::default();

    let server = yaml.server.unwrap_or_default();
    let tts = yaml.tts.unwrap_or_default();
    let edge = tts.edge.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();

    let host = server.host.or_else(|| var(env::HOST)).unwrap_or(defaults.host);
    let port = match server.port {
        Some(port) => port,
        None => parse_var(env::PORT)?.unwrap_or(defaults.port),
    };

    // A YAML tls block replaces the environment paths entirely
    let (cert_path, key_path) = match server.tls {
        Some(tls) if tls.enabled == Some(false) => (None, None),
        Some(tls) if tls.cert_path.is_some() || tls.key_path.is_some() => {
            (tls.cert_path, tls.key_path)
        }
        _ => (var(env::TLS_CERT_PATH), var(env::TLS_KEY_PATH)),
    };
    let tls = validation::validate_tls_paths(cert_path, key_path)?;

    let output_format = match tts.output_format.or_else(|| var(env::OUTPUT_FORMAT)) {
        Some(name) => name
            .parse::<AudioOutputFormat>()
            .map_err(|e| format!("Invalid output_format: {e}"))?,
        None => defaults.output_format,
    };

    let stream_channel_capacity = match tts.stream_channel_capacity {
        Some(capacity) => capacity,
        None => parse_var(env::STREAM_CHANNEL_CAPACITY)?
            .unwrap_or(defaults.stream_channel_capacity),
    };

    let rate_limit_requests_per_second = match security.rate_limit_requests_per_second {
        Some(rps) => rps,
        None => parse_var(env::RATE_LIMIT_REQUESTS_PER_SECOND)?
            .unwrap_or(defaults.rate_limit_requests_per_second),
    };
    let rate_limit_burst_size = match security.rate_limit_burst_size {
        Some(burst) => burst,
        None => parse_var(env::RATE_LIMIT_BURST_SIZE)?.unwrap_or(defaults.rate_limit_burst_size),
    };

    Ok(ServerConfig {
        host,
        port,
        tls,
        tts_provider: tts
            .provider
            .or_else(|| var(env::TTS_PROVIDER))
            .unwrap_or(defaults.tts_provider),
        default_voice: tts
            .default_voice
            .or_else(|| var(env::DEFAULT_VOICE))
            .unwrap_or(defaults.default_voice),
        default_emotion: tts
            .default_emotion
            .or_else(|| var(env::DEFAULT_EMOTION))
            .unwrap_or(defaults.default_emotion),
        output_format,
        edge_wss_url: edge
            .wss_url
            .or_else(|| var(env::EDGE_TTS_WSS_URL))
            .unwrap_or(defaults.edge_wss_url),
        edge_voices_url: edge
            .voices_url
            .or_else(|| var(env::EDGE_TTS_VOICES_URL))
            .unwrap_or(defaults.edge_voices_url),
        stream_channel_capacity,
        emotion_presets: yaml.emotions,
        cors_allowed_origins: security
            .cors_allowed_origins
            .or_else(|| var(env::CORS_ALLOWED_ORIGINS))
            .unwrap_or(defaults.cors_allowed_origins),
        rate_limit_requests_per_second,
        rate_limit_burst_size,
    })
}
