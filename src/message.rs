// src/message.rs
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`. A missing or null `message` is rejected by
/// validation rather than by the extractor.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub use_s3: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}
