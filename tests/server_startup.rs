//! Server Startup Tests
//!
//! Tests for configuration loading and application state creation. These
//! verify the server can be assembled without contacting the speech backend.

use std::io::Write;
use std::sync::Arc;

use axum::{body::Body, http::Request, http::StatusCode};
use serial_test::serial;
use tower::util::ServiceExt;

use edge_speech_gateway::{AppState, ServerConfig, TTSError, routes};

/// Helper function to create a minimal test configuration
fn create_minimal_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Test that the server can start with the default configuration
#[tokio::test]
async fn test_minimal_config_boot() {
    let app_state = AppState::new(create_minimal_config()).unwrap();
    assert_eq!(app_state.speech.provider_name(), "edge");
    assert_eq!(app_state.speech.default_voice(), "vi-VN-HoaiMyNeural");

    let app = routes::create_router(app_state);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Test that an unknown provider is rejected at startup
#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let config = ServerConfig {
        tts_provider: "polly".to_string(),
        ..create_minimal_config()
    };

    match AppState::new(config) {
        Err(TTSError::InvalidConfiguration(message)) => {
            assert!(message.contains("polly"), "{message}");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unknown provider was accepted"),
    }
}

/// Test that a broken backend endpoint is rejected at startup
#[tokio::test]
async fn test_invalid_edge_endpoint_is_rejected() {
    let config = ServerConfig {
        edge_wss_url: "https://not-a-websocket.example.com".to_string(),
        ..create_minimal_config()
    };

    assert!(matches!(
        AppState::new(config),
        Err(TTSError::InvalidConfiguration(_))
    ));
}

/// Test that custom presets from YAML reach the emotions endpoint
#[tokio::test]
#[serial]
async fn test_yaml_config_boot_with_custom_presets() {
    let file = write_config(
        r#"
server:
  host: "127.0.0.1"
  port: 8080
tts:
  default_voice: "vi-VN-NamMinhNeural"
  default_emotion: "whisper"
  output_format: "audio-24khz-96kbitrate-mono-mp3"
emotions:
  - name: whisper
    pitch: -5
    rate: -10
    volume: -40
  - name: cheerful
    pitch: 20
    rate: 15
    volume: 5
security:
  cors_allowed_origins: "https://app.example.com"
  rate_limit_requests_per_second: 100000
"#,
    );

    let config = ServerConfig::from_file(&file.path().to_path_buf()).unwrap();
    assert_eq!(config.address(), "127.0.0.1:8080");
    assert_eq!(config.cors_allowed_origins, "https://app.example.com");
    assert!(config.rate_limit_requests_per_second >= 100000);

    let app_state = AppState::new(config).unwrap();
    assert_eq!(
        app_state.speech.default_format().as_str(),
        "audio-24khz-96kbitrate-mono-mp3"
    );

    let app = routes::create_router(app_state);
    let request = Request::builder()
        .uri("/api/emotions")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["emotions"][3], "cheerful");
    assert_eq!(body["data"]["emotions"][7], "whisper");
    assert_eq!(
        body["data"]["presets"]["cheerful"],
        serde_json::json!({"pitch": 20, "rate": 15, "volume": 5})
    );
}

/// Test that a malformed YAML file fails to load
#[tokio::test]
#[serial]
async fn test_malformed_yaml_is_rejected() {
    let file = write_config("server: [not, a, map");
    assert!(ServerConfig::from_file(&file.path().to_path_buf()).is_err());
}

/// Test that an invalid output format fails to load
#[tokio::test]
#[serial]
async fn test_invalid_output_format_is_rejected() {
    let file = write_config("tts:\n  output_format: \"audio-8khz-wav\"\n");
    let err = ServerConfig::from_file(&file.path().to_path_buf()).unwrap_err();
    assert!(err.to_string().contains("output_format"), "{err}");
}

/// Test that a state can be shared between many concurrent requests
#[tokio::test]
async fn test_concurrent_request_handling() {
    let app_state = AppState::new(create_minimal_config()).unwrap();
    let app = routes::create_router(Arc::clone(&app_state));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
            app.oneshot(request).await.unwrap().status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert!(Arc::strong_count(&app_state) >= 1);
}
