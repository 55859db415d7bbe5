// Form data processing for PolyVoice API
//
// This module extracts the `audio` file field from a multipart upload.

use actix_multipart::{Field, Multipart};
use futures::{StreamExt, TryStreamExt};
use log::info;

use crate::audio::{resolve_extension, UploadedAudio};
use crate::error::HandlerError;

/// Name of the multipart field carrying the audio file
pub const AUDIO_FIELD: &str = "audio";

/// Extract the audio upload from a multipart form
///
/// # Arguments
///
/// * `form` - The multipart form from the HTTP request
/// * `max_file_size` - Upper bound on the uploaded file in bytes
///
/// # Returns
///
/// * `Result<UploadedAudio, HandlerError>` - The upload, or an error if the field is
///   missing, its format unsupported, too large, or the stream is malformed
pub async fn extract_audio(
    mut form: Multipart,
    max_file_size: usize,
) -> Result<UploadedAudio, HandlerError> {
    let mut audio: Option<UploadedAudio> = None;

    while let Some(mut field) = form
        .try_next()
        .await
        .map_err(|e| HandlerError::form_error(format!("Error reading multipart form: {}", e)))?
    {
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|name| name.to_string()))
            .unwrap_or_default();

        if field_name != AUDIO_FIELD || audio.is_some() {
            // Skip unknown fields and any repeated audio field
            drain_field(&mut field).await?;
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|name| name.to_string()));
        let content_type = field.content_type().map(|mime| mime.to_string());

        info!("Processing file: {}", filename.as_deref().unwrap_or("<unnamed>"));
        info!(
            "Content type: {}",
            content_type.as_deref().unwrap_or("<unspecified>")
        );

        // Reject unsupported formats before reading the payload
        resolve_extension(filename.as_deref())?;

        let data = read_file_field(&mut field, max_file_size).await?;

        audio = Some(UploadedAudio {
            data,
            filename,
            content_type,
        });
    }

    audio.ok_or(HandlerError::NoAudioFile)
}

/// Read a file field into memory, enforcing the size limit
async fn read_file_field(field: &mut Field, max_file_size: usize) -> Result<Vec<u8>, HandlerError> {
    let mut data = Vec::new();

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| {
            HandlerError::form_error(format!("Error processing file upload: {}", e))
        })?;

        if data.len() + chunk.len() > max_file_size {
            return Err(HandlerError::FileTooLarge(
                data.len() + chunk.len(),
                max_file_size,
            ));
        }

        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

/// Consume a field without keeping its content
async fn drain_field(field: &mut Field) -> Result<(), HandlerError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| HandlerError::form_error(format!("Error reading field: {}", e)))?;
    }
    Ok(())
}
