//! Edge backend configuration.

use std::time::Duration;

use url::Url;

use super::{
    CHROMIUM_FULL_VERSION, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_STREAM_CHANNEL_CAPACITY,
    EDGE_TTS_VOICES_URL, EDGE_TTS_WSS_URL, TRUSTED_CLIENT_TOKEN,
};
use crate::core::tts::base::{TTSError, TTSResult};

/// Settings for [`EdgeTTS`](super::EdgeTTS).
///
/// Endpoints are overridable so tests and proxies can redirect traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTTSConfig {
    /// WebSocket synthesis endpoint (`ws://` or `wss://`)
    pub wss_url: String,
    /// Voice list endpoint (`http://` or `https://`)
    pub voices_url: String,
    pub trusted_client_token: String,
    /// Full browser version, e.g. "130.0.2849.68"
    pub chromium_version: String,
    /// Chunks buffered between the socket reader and a stream consumer
    pub stream_channel_capacity: usize,
    pub connect_timeout: Duration,
}

impl Default for EdgeTTSConfig {
    fn default() -> Self {
        Self {
            wss_url: EDGE_TTS_WSS_URL.to_string(),
            voices_url: EDGE_TTS_VOICES_URL.to_string(),
            trusted_client_token: TRUSTED_CLIENT_TOKEN.to_string(),
            chromium_version: CHROMIUM_FULL_VERSION.to_string(),
            stream_channel_capacity: DEFAULT_STREAM_CHANNEL_CAPACITY,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl EdgeTTSConfig {
    pub fn with_endpoints(wss_url: impl Into<String>, voices_url: impl Into<String>) -> Self {
        Self {
            wss_url: wss_url.into(),
            voices_url: voices_url.into(),
            ..Default::default()
        }
    }

    /// Value of the `Sec-MS-GEC-Version` parameter.
    pub fn sec_ms_gec_version(&self) -> String {
        format!("1-{}", self.chromium_version)
    }

    /// Browser major version, used in the user agent.
    pub fn chromium_major_version(&self) -> &str {
        self.chromium_version
            .split('.')
            .next()
            .unwrap_or(&self.chromium_version)
    }

    pub fn user_agent(&self) -> String {
        let major = self.chromium_major_version();
        format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.0.0"
        )
    }

    pub fn validate(&self) -> TTSResult<()> {
        check_url(&self.wss_url, &["ws", "wss"], "wss_url")?;
        check_url(&self.voices_url, &["http", "https"], "voices_url")?;

        if self.trusted_client_token.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "trusted_client_token must not be empty".to_string(),
            ));
        }
        if self.chromium_version.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "chromium_version must not be empty".to_string(),
            ));
        }
        if self.stream_channel_capacity == 0 {
            return Err(TTSError::InvalidConfiguration(
                "stream_channel_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_url(value: &str, schemes: &[&str], field: &str) -> TTSResult<()> {
    let url = Url::parse(value)
        .map_err(|e| TTSError::InvalidConfiguration(format!("{field} '{value}' is invalid: {e}")))?;
    if !schemes.contains(&url.scheme()) {
        return Err(TTSError::InvalidConfiguration(format!(
            "{field} must use one of [{}], got '{}'",
            schemes.join(", "),
            url.scheme()
        )));
    }
    Ok(())
}
