// PolyVoice API HTTP handlers
//
// This module contains the HTTP handlers for the PolyVoice API.
// It provides the interface between HTTP requests and the transcription service.

pub mod form;
pub mod process;
pub mod routes;

// Re-export handlers for easier access
pub use self::routes::{configure, cors, health, transcribe};
