//! HTTP request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check endpoint and the shared response envelope
//! - `emotions` - Emotion preset listing
//! - `speak` - Text-to-speech endpoints (base64, raw audio, streaming)
//! - `voices` - Voice listing endpoints

pub mod api;
pub mod emotions;
pub mod speak;
pub mod voices;
