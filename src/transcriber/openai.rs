//! OpenAI transcription client.
//!
//! Uploads the staged file to `/audio/transcriptions` and reads the `text` field of
//! the JSON response.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{Transcriber, TranscriberError};
use crate::audio::{mime_type, DEFAULT_EXTENSION};
use crate::config::ApiConfig;

#[derive(Deserialize)]
struct TranscriptionApiResponse {
    text: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Transcriber backed by the OpenAI audio API
pub struct OpenAiTranscriber {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl OpenAiTranscriber {
    pub fn new(
        api_key: Option<SecretString>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TranscriberError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranscriberError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Builds a client from the runtime configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, TranscriberError> {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.transcription_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'))
    }

    fn api_key(&self) -> Result<&str, TranscriberError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
            .ok_or(TranscriberError::MissingApiKey)
    }
}

/// Extracts a readable message from an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, file: &Path, model: &str) -> Result<String, TranscriberError> {
        let api_key = self.api_key()?;

        let data = tokio::fs::read(file).await?;
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("audio{}", DEFAULT_EXTENSION));
        let extension = file
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(
            "OpenAI transcription request: {} bytes, model={}",
            data.len(),
            model
        );

        let part = Part::bytes(data)
            .file_name(filename)
            .mime_str(mime_type(&extension))
            .map_err(|e| TranscriberError::Request(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", model.to_string())
            .text("response_format", "json");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI request failed: {}", e);
                TranscriberError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = error_message(&body);
            error!("OpenAI API error ({}): {}", status, message);
            return Err(TranscriberError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: TranscriptionApiResponse = response
            .json()
            .await
            .map_err(|e| TranscriberError::InvalidResponse(e.to_string()))?;

        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let transcriber =
            OpenAiTranscriber::new(None, "http://localhost:9000/v1/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            transcriber.endpoint(),
            "http://localhost:9000/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"message":"Invalid file format.","type":"invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Invalid file format.");
        assert_eq!(error_message("  upstream down "), "upstream down");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let transcriber =
            OpenAiTranscriber::new(None, "http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let result = transcriber
            .transcribe(Path::new("/nonexistent/clip.mp3"), "gpt-4o-mini-transcribe")
            .await;
        assert!(matches!(result, Err(TranscriberError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let transcriber = OpenAiTranscriber::new(
            Some(SecretString::from("sk-test")),
            "http://127.0.0.1:1",
            Duration::from_secs(1),
        )
        .unwrap();
        let result = transcriber
            .transcribe(Path::new("/nonexistent/clip.mp3"), "gpt-4o-mini-transcribe")
            .await;
        assert!(matches!(result, Err(TranscriberError::Io(_))));
    }
}
