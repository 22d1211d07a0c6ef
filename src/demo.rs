//! Command line demo of the synthesis facade.
//!
//! This module powers the `edge-speech-gateway demo` CLI command. It synthesizes
//! a paragraph of Vietnamese text with the configured defaults, prints a short
//! report, saves the audio next to the given path and lists the Vietnamese
//! voices.
//!
//! ```text
//! $ edge-speech-gateway demo --output ./sample_output
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::state::AppState;

/// Text synthesized when none is given on the command line.
pub const DEMO_TEXT: &str = "Việt Nam là một đất nước giàu truyền thống lịch sử và văn hóa, nằm bên bờ Biển Đông với hình dáng chữ S thân thương. Trải qua hàng nghìn năm dựng nước và giữ nước, Việt Nam đã hình thành nên tinh thần đoàn kết, lòng yêu nước và ý chí kiên cường của con người.";

pub const DEFAULT_OUTPUT: &str = "./sample_output";

/// Characters of base64 shown in the preview line.
const PREVIEW_CHARS: usize = 100;

/// Runs the demo against `state`, printing progress to stdout.
pub async fn run(state: &AppState, text: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let text = text.unwrap_or_else(|| DEMO_TEXT.to_string());
    let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let options = state.emotions.options_for(Some(&state.config.default_emotion));

    println!("Edge TTS demo ({})\n", state.speech.default_voice());
    println!("Text: {text}");

    println!("\nGenerating audio as base64...");
    let started = Instant::now();
    let result = state
        .speech
        .synthesize_to_base64(&text, None, &options)
        .await
        .context("Failed to synthesize demo text")?;
    println!("Done in {}ms", started.elapsed().as_millis());
    println!("Base64 length: {} characters", result.base64.len());
    println!(
        "Audio info: {}",
        serde_json::to_string_pretty(&result.info).context("Failed to render audio info")?
    );
    let preview: String = result.base64.chars().take(PREVIEW_CHARS).collect();
    println!("Preview (first {PREVIEW_CHARS} chars): {preview}...");

    println!("\nSaving audio to file...");
    let path = state
        .speech
        .synthesize_to_file(&text, &output, None, &options)
        .await
        .with_context(|| format!("Failed to save audio to {}", output.display()))?;
    println!("File saved at: {}", path.display());

    println!("\nAvailable Vietnamese voices:");
    let voices = state
        .speech
        .list_vietnamese_voices()
        .await
        .context("Failed to list Vietnamese voices")?;
    for voice in voices {
        println!(
            "  - {} ({}): {}",
            voice.short_name, voice.gender, voice.friendly_name
        );
    }

    Ok(())
}
