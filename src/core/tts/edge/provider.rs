//! Edge read-aloud synthesizer.

use std::time::Instant;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use http::HeaderValue;
use time::OffsetDateTime;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::EDGE_ORIGIN;
use super::config::EdgeTTSConfig;
use super::messages::{
    Prosody, TURN_END_PATH, build_ssml, generate_sec_ms_gec, js_date_string, parse_binary_frame,
    speech_config_frame, ssml_frame, text_frame_path,
};
use crate::core::tts::base::{
    AudioStream, SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult, VoiceDescriptor,
};

type EdgeSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Speech synthesizer backed by the Edge read-aloud service.
///
/// Every synthesis opens its own WebSocket session, so one instance can serve
/// any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct EdgeTTS {
    config: EdgeTTSConfig,
    http: reqwest::Client,
}

impl EdgeTTS {
    pub fn new(config: EdgeTTSConfig) -> TTSResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| {
                TTSError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { config, http })
    }

    /// Synthesis URL with a fresh connection id and signature.
    pub fn synthesis_url(&self) -> TTSResult<Url> {
        let mut url = Url::parse(&self.config.wss_url)
            .map_err(|e| TTSError::InvalidConfiguration(format!("Invalid wss_url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("TrustedClientToken", &self.config.trusted_client_token)
            .append_pair("ConnectionId", &Uuid::new_v4().simple().to_string())
            .append_pair(
                "Sec-MS-GEC",
                &generate_sec_ms_gec(&self.config.trusted_client_token, OffsetDateTime::now_utc()),
            )
            .append_pair("Sec-MS-GEC-Version", &self.config.sec_ms_gec_version());
        Ok(url)
    }

    pub fn voices_url(&self) -> TTSResult<Url> {
        let mut url = Url::parse(&self.config.voices_url)
            .map_err(|e| TTSError::InvalidConfiguration(format!("Invalid voices_url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("trustedclienttoken", &self.config.trusted_client_token)
            .append_pair(
                "Sec-MS-GEC",
                &generate_sec_ms_gec(&self.config.trusted_client_token, OffsetDateTime::now_utc()),
            )
            .append_pair("Sec-MS-GEC-Version", &self.config.sec_ms_gec_version());
        Ok(url)
    }

    /// Connects and sends both request frames. Options are validated before any
    /// network traffic.
    async fn open_session(&self, request: &SynthesisRequest) -> TTSResult<EdgeSocket> {
        let prosody = Prosody::from_options(&request.options)?;
        let ssml = build_ssml(&request.text, &request.voice, &prosody);

        let url = self.synthesis_url()?;
        let mut ws_request = url
            .as_str()
            .into_client_request()
            .map_err(|e| TTSError::ConnectionFailed(format!("Invalid WebSocket request: {e}")))?;

        let user_agent = HeaderValue::from_str(&self.config.user_agent())
            .map_err(|e| TTSError::InvalidConfiguration(format!("Invalid user agent: {e}")))?;
        let headers = ws_request.headers_mut();
        headers.insert("Origin", HeaderValue::from_static(EDGE_ORIGIN));
        headers.insert("User-Agent", user_agent);
        headers.insert("Pragma", HeaderValue::from_static("no-cache"));
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
        headers.insert(
            "Accept-Language",
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            "Accept-Encoding",
            HeaderValue::from_static("gzip, deflate, br"),
        );

        debug!(
            "Connecting to Edge TTS: {}",
            self.config.wss_url.split('?').next().unwrap_or(&self.config.wss_url)
        );

        let (mut ws, response) = match timeout(self.config.connect_timeout, connect_async(ws_request)).await {
            Ok(Ok(connected)) => connected,
            Ok(Err(e)) => {
                return Err(TTSError::ConnectionFailed(format!(
                    "WebSocket connection failed: {e}"
                )));
            }
            Err(_) => {
                return Err(TTSError::ConnectionFailed(format!(
                    "Connection timed out after {}s",
                    self.config.connect_timeout.as_secs()
                )));
            }
        };
        debug!("Connected to Edge TTS (status: {})", response.status());

        let timestamp = js_date_string(OffsetDateTime::now_utc());
        let request_id = Uuid::new_v4().simple().to_string();

        ws.send(Message::text(speech_config_frame(
            &timestamp,
            request.output_format,
        )))
        .await
        .map_err(|e| TTSError::WebSocketError(format!("Failed to send speech.config: {e}")))?;

        ws.send(Message::text(ssml_frame(&request_id, &timestamp, &ssml)))
            .await
            .map_err(|e| TTSError::WebSocketError(format!("Failed to send ssml: {e}")))?;

        debug!(
            "Sent synthesis request {request_id}: voice={}, format={}, chars={}",
            request.voice,
            request.output_format,
            request.text.chars().count()
        );

        Ok(ws)
    }
}

/// Reads until the next audio chunk. `Ok(None)` marks the end of the turn.
async fn next_audio_chunk(ws: &mut EdgeSocket) -> TTSResult<Option<Bytes>> {
    while let Some(message) = ws.next().await {
        let message = message.map_err(|e| TTSError::WebSocketError(e.to_string()))?;
        match message {
            Message::Binary(data) => {
                let frame = parse_binary_frame(&data)?;
                if frame.is_audio() && !frame.body.is_empty() {
                    return Ok(Some(data.slice_ref(frame.body)));
                }
            }
            Message::Text(text) => match text_frame_path(text.as_str()) {
                Some(TURN_END_PATH) => return Ok(None),
                path => debug!("Edge TTS frame: {}", path.unwrap_or("<no path>")),
            },
            Message::Close(frame) => {
                debug!("Edge TTS closed the connection: {:?}", frame);
                return Ok(None);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
    Ok(None)
}

#[async_trait]
impl SpeechSynthesizer for EdgeTTS {
    fn provider_name(&self) -> &'static str {
        "edge"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
        let started = Instant::now();
        let mut ws = self.open_session(request).await?;

        let mut audio = BytesMut::new();
        let outcome = loop {
            match next_audio_chunk(&mut ws).await {
                Ok(Some(chunk)) => audio.extend_from_slice(&chunk),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let _ = ws.close(None).await;
        outcome?;

        if audio.is_empty() {
            warn!("Edge TTS returned no audio for voice {}", request.voice);
            return Err(TTSError::NoAudioReceived {
                voice: request.voice.clone(),
            });
        }

        debug!(
            "Edge TTS turn finished: {} bytes in {}ms",
            audio.len(),
            started.elapsed().as_millis()
        );
        Ok(audio.freeze())
    }

    async fn synthesize_stream(&self, request: SynthesisRequest) -> TTSResult<AudioStream> {
        let mut ws = self.open_session(&request).await?;
        let (tx, mut rx) = mpsc::channel::<TTSResult<Bytes>>(self.config.stream_channel_capacity);
        let voice = request.voice;

        tokio::spawn(async move {
            let mut produced = 0usize;
            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        debug!("Stream consumer dropped, abandoning Edge TTS session");
                        break;
                    }
                    next = next_audio_chunk(&mut ws) => match next {
                        Ok(Some(chunk)) => {
                            produced += chunk.len();
                            if tx.send(Ok(chunk)).await.is_err() {
                                debug!("Stream consumer dropped, abandoning Edge TTS session");
                                break;
                            }
                        }
                        Ok(None) => {
                            if produced == 0 {
                                let _ = tx
                                    .send(Err(TTSError::NoAudioReceived { voice: voice.clone() }))
                                    .await;
                            }
                            break;
                        }
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            break;
                        }
                    }
                }
            }
            let _ = ws.close(None).await;
            debug!("Edge TTS stream finished after {produced} bytes");
        });

        Ok(Box::pin(async_stream::stream! {
            while let Some(item) = rx.recv().await {
                yield item;
            }
        }))
    }

    async fn list_voices(&self) -> TTSResult<Vec<VoiceDescriptor>> {
        let url = self.voices_url()?;
        let response = self
            .http
            .get(url)
            .header("Accept", "*/*")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| TTSError::VoiceListFailed(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TTSError::VoiceListFailed(format!("HTTP {status}: {body}")));
        }

        let voices: Vec<VoiceDescriptor> = response
            .json()
            .await
            .map_err(|e| TTSError::VoiceListFailed(format!("Invalid voice list: {e}")))?;

        info!("Fetched {} voices from Edge TTS", voices.len());
        Ok(voices)
    }
}
