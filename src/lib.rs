// PolyVoice API Library
//
// This crate provides an HTTP API that transcribes uploaded audio files with a
// hosted speech-to-text model and reports processing time and cost estimates.

pub mod audio;
pub mod config;
pub mod config_loader;
pub mod config_validator;
pub mod error;
pub mod estimates;
pub mod file_utils;
pub mod handlers;
pub mod models;
pub mod transcriber;

// Re-export common types for easier access
pub use config::ApiConfig;
pub use error::HandlerError;
pub use handlers::{configure, cors, health, transcribe};
pub use models::{ErrorResponse, HealthResponse, TranscriptionResponse};
pub use transcriber::{OpenAiTranscriber, Transcriber, TranscriberError, TRANSCRIPTION_MODEL};
