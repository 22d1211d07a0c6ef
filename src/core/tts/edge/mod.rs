//! Microsoft Edge "read aloud" TTS backend.
//!
//! The read-aloud service is the speech endpoint the Edge browser uses. It needs
//! no API key, only the browser's trusted client token and a time-based
//! `Sec-MS-GEC` signature.
//!
//! # Protocol
//!
//! One WebSocket session per synthesis:
//!
//! 1. connect to [`EDGE_TTS_WSS_URL`] with the token, a connection id and the
//!    signature in the query string;
//! 2. send a `speech.config` text frame selecting the output format;
//! 3. send an `ssml` text frame with the voice, prosody and text;
//! 4. read binary `Path:audio` frames until a `Path:turn.end` text frame.
//!
//! Voices are listed over plain HTTPS at [`EDGE_TTS_VOICES_URL`].
//!
//! # Example
//!
//! ```rust,ignore
//! use edge_speech_gateway::core::tts::edge::{EdgeTTS, EdgeTTSConfig};
//! use edge_speech_gateway::core::tts::SpeechSynthesizer;
//!
//! let tts = EdgeTTS::new(EdgeTTSConfig::default())?;
//! let voices = tts.list_voices().await?;
//! ```

pub mod config;
pub mod messages;
pub mod provider;


pub use config::EdgeTTSConfig;
pub use messages::{BinaryFrame, Prosody};
pub use provider::EdgeTTS;

/// Synthesis WebSocket endpoint.
pub const EDGE_TTS_WSS_URL: &str =
    "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1";

/// Voice catalogue endpoint.
pub const EDGE_TTS_VOICES_URL: &str =
    "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/voices/list";

/// Client token shipped with the Edge browser.
pub const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// Browser version the service expects in `Sec-MS-GEC-Version` and the user agent.
pub const CHROMIUM_FULL_VERSION: &str = "130.0.2849.68";

pub const EDGE_ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";

pub const DEFAULT_STREAM_CHANNEL_CAPACITY: usize = 32;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
