// PolyVoice API data models
//
// This module contains the JSON bodies returned by the API.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Whether an OpenAI credential was present at startup
    pub openai_configured: bool,
}

/// Successful transcription response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// Transcript returned by the model
    pub text: String,
    /// Model identifier used for the call
    pub model_used: String,
    /// Wall-clock duration of the external call
    pub processing_time_ms: u64,
    /// Estimated cost in dollars, 6 decimals
    pub estimated_cost: f64,
    /// Estimated audio length, 2 decimals
    pub estimated_minutes: f64,
}

/// Error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional detail, usually the HTTP status
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Body used for unexpected failures
    pub fn internal() -> Self {
        Self {
            error: "Internal server error".to_string(),
            detail: Some("An unexpected error occurred".to_string()),
        }
    }
}
