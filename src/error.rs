// Error handling for PolyVoice API
//
// This module defines the errors returned by the request handlers and how they map
// onto HTTP responses.

use std::io;
use thiserror::Error;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::audio::supported_formats_list;
use crate::models::ErrorResponse;
use crate::transcriber::TranscriberError;

/// Errors that can occur in the PolyVoice API handlers
#[derive(Error, Debug)]
pub enum HandlerError {
    /// No `audio` field in the multipart form
    #[error("No audio file provided")]
    NoAudioFile,

    /// The `audio` field carried zero bytes
    #[error("Empty audio file")]
    EmptyAudioFile,

    /// The declared filename has an extension outside the supported set
    #[error("Unsupported audio format. Supported formats: {}", supported_formats_list())]
    UnsupportedFormat(String),

    /// The multipart stream could not be read
    #[error("Form error: {0}")]
    FormError(String),

    /// The upload exceeded the configured size limit
    #[error("File too large: {0} bytes exceeds limit of {1} bytes")]
    FileTooLarge(usize, usize),

    /// Staging, the external call or its timeout failed
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Unexpected failure whose details are not exposed to clients
    #[error("Internal server error")]
    Internal(String),
}

impl HandlerError {
    /// Create a new FormError
    pub fn form_error<S: Into<String>>(msg: S) -> Self {
        Self::FormError(msg.into())
    }

    /// Whether the client caused this error
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            HandlerError::NoAudioFile
                | HandlerError::EmptyAudioFile
                | HandlerError::UnsupportedFormat(_)
                | HandlerError::FormError(_)
                | HandlerError::FileTooLarge(_, _)
        )
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::NoAudioFile
            | HandlerError::EmptyAudioFile
            | HandlerError::UnsupportedFormat(_)
            | HandlerError::FormError(_) => StatusCode::BAD_REQUEST,
            HandlerError::FileTooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerError::TranscriptionFailed(_) | HandlerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            HandlerError::Internal(_) => ErrorResponse::internal(),
            _ => ErrorResponse {
                error: self.to_string(),
                detail: Some(format!("HTTP {}", status.as_u16())),
            },
        };

        HttpResponse::build(status).json(body)
    }
}

/// Convert TranscriberError to HandlerError
impl From<TranscriberError> for HandlerError {
    fn from(err: TranscriberError) -> Self {
        HandlerError::TranscriptionFailed(err.to_string())
    }
}

/// Staging I/O failures are transcription failures
impl From<io::Error> for HandlerError {
    fn from(err: io::Error) -> Self {
        HandlerError::TranscriptionFailed(err.to_string())
    }
}
