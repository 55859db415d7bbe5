// API route handlers for PolyVoice API
//
// This module contains the route handlers and the `/api/v1` route table.

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use log::{error, info, warn};

use crate::config::ApiConfig;
use crate::error::HandlerError;
use crate::handlers::form::extract_audio;
use crate::handlers::process::transcribe_upload;
use crate::models::HealthResponse;
use crate::transcriber::Transcriber;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "PolyVoice Transcription API";

/// Prefix of every versioned route
pub const API_PREFIX: &str = "/api/v1";

/// Seconds browsers may cache CORS preflight responses
pub const CORS_MAX_AGE: usize = 3600;

/// Health check endpoint
///
/// Reports the service version and whether the OpenAI credential is configured.
#[get("/health")]
pub async fn health(config: web::Data<ApiConfig>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        openai_configured: config.openai_configured(),
    })
}

/// Handler for transcription requests
///
/// Accepts a multipart `audio` field in M4A, MP3, WAV, OGG or WEBM format and returns
/// the transcript with processing time and cost estimates.
#[post("/transcribe")]
pub async fn transcribe(
    form: Multipart,
    config: web::Data<ApiConfig>,
    transcriber: web::Data<dyn Transcriber>,
) -> Result<HttpResponse, HandlerError> {
    info!("Transcribe endpoint called");

    let upload = extract_audio(form, config.max_file_size)
        .await
        .map_err(log_failure)?;
    let response = transcribe_upload(upload, &config, transcriber.into_inner())
        .await
        .map_err(log_failure)?;

    info!("Returning result: {}", response.text.chars().take(50).collect::<String>());
    Ok(HttpResponse::Ok().json(response))
}

/// Logs client mistakes as warnings and server failures as errors
fn log_failure(err: HandlerError) -> HandlerError {
    if err.is_invalid_request() {
        warn!("Rejected transcription request: {}", err);
    } else {
        error!("Transcription request failed: {}", err);
    }
    err
}

/// Registers the versioned API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope(API_PREFIX).service(health).service(transcribe));
}

/// Permissive CORS: any origin, method and header
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(CORS_MAX_AGE)
}
