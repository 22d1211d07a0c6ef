//! Environment variable helpers.

use std::env;
use std::error::Error;
use std::str::FromStr;

pub const HOST: &str = "HOST";
pub const PORT: &str = "PORT";
pub const TLS_CERT_PATH: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH: &str = "TLS_KEY_PATH";
pub const TTS_PROVIDER: &str = "TTS_PROVIDER";
pub const DEFAULT_VOICE: &str = "DEFAULT_VOICE";
pub const DEFAULT_EMOTION: &str = "DEFAULT_EMOTION";
pub const OUTPUT_FORMAT: &str = "OUTPUT_FORMAT";
pub const EDGE_TTS_WSS_URL: &str = "EDGE_TTS_WSS_URL";
pub const EDGE_TTS_VOICES_URL: &str = "EDGE_TTS_VOICES_URL";
pub const STREAM_CHANNEL_CAPACITY: &str = "STREAM_CHANNEL_CAPACITY";
pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
pub const RATE_LIMIT_REQUESTS_PER_SECOND: &str = "RATE_LIMIT_REQUESTS_PER_SECOND";
pub const RATE_LIMIT_BURST_SIZE: &str = "RATE_LIMIT_BURST_SIZE";

/// Every variable the gateway reads.
pub const ALL_VARS: &[&str] = &[
    HOST,
    PORT,
    TLS_CERT_PATH,
    TLS_KEY_PATH,
    TTS_PROVIDER,
    DEFAULT_VOICE,
    DEFAULT_EMOTION,
    OUTPUT_FORMAT,
    EDGE_TTS_WSS_URL,
    EDGE_TTS_VOICES_URL,
    STREAM_CHANNEL_CAPACITY,
    CORS_ALLOWED_ORIGINS,
    RATE_LIMIT_REQUESTS_PER_SECOND,
    RATE_LIMIT_BURST_SIZE,
];

/// Reads a variable, treating unset and blank the same.
pub fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads and parses a variable. Unset or blank yields `Ok(None)`.
pub fn parse_var<T>(name: &str) -> Result<Option<T>, Box<dyn Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid {name} value '{raw}': {e}").into()),
        None => Ok(None),
    }
}
