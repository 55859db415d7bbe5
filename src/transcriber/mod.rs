//! Transcription service abstraction
//!
//! The request handler depends on the [`Transcriber`] trait rather than on a concrete
//! client, so tests can substitute a fake for the hosted model.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod openai;

pub use self::openai::OpenAiTranscriber;

/// Model used for every transcription
pub const TRANSCRIPTION_MODEL: &str = "gpt-4o-mini-transcribe";

/// Errors raised while calling the transcription service
#[derive(Error, Debug)]
pub enum TranscriberError {
    #[error("OpenAI API key is not configured")]
    MissingApiKey,

    #[error("Failed to read staged audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request to transcription service failed: {0}")]
    Request(String),

    #[error("Transcription service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from transcription service: {0}")]
    InvalidResponse(String),

    #[error("Transcription service did not respond within {0:?}")]
    Timeout(Duration),
}

/// Capability to turn a staged audio file into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes the file at `file` with `model`, returning the transcript text
    async fn transcribe(&self, file: &Path, model: &str) -> Result<String, TranscriberError>;
}
