//! Wire format of the Edge read-aloud protocol.
//!
//! Text frames are HTTP-like: `Key:Value` header lines separated by CRLF, a
//! blank line, then the body. Binary frames prefix the header block with its
//! length as a big-endian `u16` and carry raw audio after it.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::core::emotion::{PITCH_KEY, RATE_KEY, SynthesisOptions, VOLUME_KEY};
use crate::core::tts::base::{AudioOutputFormat, TTSError, TTSResult};

pub const AUDIO_PATH: &str = "audio";
pub const TURN_END_PATH: &str = "turn.end";

/// Seconds between 1601-01-01 (Windows file time epoch) and the Unix epoch.
const WIN_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
/// The signature changes every five minutes.
const GEC_WINDOW_SECS: i64 = 300;
const TICKS_PER_SEC: i64 = 10_000_000;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static PROSODY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[+-]?\d+(?:\.\d+)?(?:%|Hz|st)?|x-low|low|medium|high|x-high|x-slow|slow|fast|x-fast|silent|x-soft|soft|loud|x-loud|default)$",
    )
    .expect("prosody pattern is valid")
});

/// Computes the `Sec-MS-GEC` signature for `now`.
///
/// Uppercase hex SHA-256 of the Windows file time (100ns ticks) rounded down to
/// the five minute window, followed by the client token.
pub fn generate_sec_ms_gec(trusted_client_token: &str, now: OffsetDateTime) -> String {
    let mut secs = now.unix_timestamp() + WIN_EPOCH_OFFSET_SECS;
    secs -= secs.rem_euclid(GEC_WINDOW_SECS);
    let ticks = secs * TICKS_PER_SEC;

    let digest = Sha256::digest(format!("{ticks}{trusted_client_token}").as_bytes());
    hex::encode_upper(digest)
}

/// Timestamp in the JavaScript `Date.toString()` shape the service expects,
/// always in UTC: `Thu Oct 16 2026 12:00:00 GMT+0000 (Coordinated Universal Time)`.
pub fn js_date_string(now: OffsetDateTime) -> String {
    let now = now.to_offset(time::UtcOffset::UTC);
    let day = DAY_NAMES[now.weekday().number_days_from_monday() as usize];
    let month = MONTH_NAMES[u8::from(now.month()) as usize - 1];
    format!(
        "{day} {month} {:02} {} {:02}:{:02}:{:02} GMT+0000 (Coordinated Universal Time)",
        now.day(),
        now.year(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

pub fn speech_config_frame(timestamp: &str, format: AudioOutputFormat) -> String {
    format!(
        "X-Timestamp:{timestamp}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n\
         {{\"context\":{{\"synthesis\":{{\"audio\":{{\"metadataoptions\":{{\
         \"sentenceBoundaryEnabled\":\"false\",\"wordBoundaryEnabled\":\"true\"}},\
         \"outputFormat\":\"{}\"}}}}}}}}\r\n",
        format.as_str()
    )
}

pub fn ssml_frame(request_id: &str, timestamp: &str, ssml: &str) -> String {
    format!(
        "X-RequestId:{request_id}\r\n\
         Content-Type:application/ssml+xml\r\n\
         X-Timestamp:{timestamp}Z\r\n\
         Path:ssml\r\n\r\n\
         {ssml}"
    )
}

/// Validated prosody attributes of an SSML request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prosody {
    pub pitch: String,
    pub rate: String,
    pub volume: String,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            pitch: "+0Hz".to_string(),
            rate: "+0%".to_string(),
            volume: "+0%".to_string(),
        }
    }
}

impl Prosody {
    /// Reads `pitch`, `rate` and `volume` from the options, keeping defaults for
    /// missing keys. Values that SSML would not accept are rejected.
    pub fn from_options(options: &SynthesisOptions) -> TTSResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            pitch: prosody_value(options, PITCH_KEY, defaults.pitch)?,
            rate: prosody_value(options, RATE_KEY, defaults.rate)?,
            volume: prosody_value(options, VOLUME_KEY, defaults.volume)?,
        })
    }
}

fn prosody_value(options: &SynthesisOptions, key: &str, default: String) -> TTSResult<String> {
    let Some(raw) = options.get(key) else {
        return Ok(default);
    };
    let value = options.get_text(key).ok_or_else(|| TTSError::InvalidOption {
        name: key.to_string(),
        reason: format!("expected a string or number, got {raw}"),
    })?;
    let value = value.trim();
    if PROSODY_VALUE.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(TTSError::InvalidOption {
            name: key.to_string(),
            reason: format!("'{value}' is not a valid prosody value"),
        })
    }
}

/// Replaces control characters the service rejects with spaces.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => c,
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn build_ssml(text: &str, voice: &str, prosody: &Prosody) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{}'><prosody pitch='{}' rate='{}' volume='{}'>{}</prosody></voice></speak>",
        escape_xml(voice),
        prosody.pitch,
        prosody.rate,
        prosody.volume,
        escape_xml(&sanitize_text(text))
    )
}

/// Value of the `Path` header in a text frame.
pub fn text_frame_path(frame: &str) -> Option<&str> {
    let headers = frame.split("\r\n\r\n").next().unwrap_or(frame);
    header_value(headers, "Path")
}

fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers.split("\r\n").find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

/// A decoded binary frame, borrowing from the received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryFrame<'a> {
    pub path: Option<&'a str>,
    pub body: &'a [u8],
}

impl BinaryFrame<'_> {
    pub fn is_audio(&self) -> bool {
        self.path == Some(AUDIO_PATH)
    }
}

pub fn parse_binary_frame(data: &[u8]) -> TTSResult<BinaryFrame<'_>> {
    if data.len() < 2 {
        return Err(TTSError::ProtocolError(format!(
            "binary frame too short ({} bytes)",
            data.len()
        )));
    }
    let header_len = u16::from_be_bytes([data[0], data[1]]) as usize;
    let body_start = 2 + header_len;
    if data.len() < body_start {
        return Err(TTSError::ProtocolError(format!(
            "binary frame header length {header_len} exceeds frame size {}",
            data.len()
        )));
    }

    let headers = std::str::from_utf8(&data[2..body_start])
        .map_err(|e| TTSError::ProtocolError(format!("binary frame header is not UTF-8: {e}")))?;

    Ok(BinaryFrame {
        path: header_value(headers, "Path"),
        body: &data[body_start..],
    })
}
