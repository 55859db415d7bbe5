// Transcription request processing
//
// Validates an upload, stages it on disk, calls the transcription service and builds
// the response. The staged file is owned by the task that performs the external call,
// so it is removed even when the client disconnects and the handler future is dropped.

use std::sync::Arc;
use std::time::Instant;

use log::{error, info};

use crate::audio::UploadedAudio;
use crate::config::ApiConfig;
use crate::error::HandlerError;
use crate::estimates::Estimate;
use crate::file_utils::StagedFile;
use crate::models::TranscriptionResponse;
use crate::transcriber::{Transcriber, TranscriberError, TRANSCRIPTION_MODEL};

/// Characters of transcript shown in logs
const PREVIEW_CHARS: usize = 50;

/// Checks an upload and returns the extension to stage it with
///
/// Checks run in order: format, then emptiness.
pub fn validate_upload(upload: &UploadedAudio) -> Result<&'static str, HandlerError> {
    let extension = upload.extension()?;
    if upload.is_empty() {
        return Err(HandlerError::EmptyAudioFile);
    }
    Ok(extension)
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Run the full transcription lifecycle for one upload
pub async fn transcribe_upload(
    upload: UploadedAudio,
    config: &ApiConfig,
    transcriber: Arc<dyn Transcriber>,
) -> Result<TranscriptionResponse, HandlerError> {
    let extension = validate_upload(&upload)?;
    info!("Using file extension: {}", extension);

    config.ensure_temp_dir()?;
    let staged = StagedFile::create(&config.temp_dir, extension, &upload.data)?;

    let estimate = Estimate::for_size(upload.len());
    info!(
        "File size: {:.2}MB, Estimated duration: {:.2} minutes",
        upload.len() as f64 / (1024.0 * 1024.0),
        estimate.minutes
    );
    drop(upload);

    let timeout = config.transcription_timeout;
    info!("Starting transcription with {}...", TRANSCRIPTION_MODEL);

    let task = tokio::spawn(async move {
        let started = Instant::now();
        let outcome =
            tokio::time::timeout(timeout, transcriber.transcribe(staged.path(), TRANSCRIPTION_MODEL))
                .await;
        let elapsed = started.elapsed();
        drop(staged);

        let outcome = match outcome {
            Ok(result) => result,
            Err(_) => Err(TranscriberError::Timeout(timeout)),
        };
        (outcome, elapsed)
    });

    let (outcome, elapsed) = task.await.map_err(|e| {
        error!("Transcription task failed: {}", e);
        HandlerError::Internal(e.to_string())
    })?;

    let text = outcome.map_err(|e| {
        error!("Transcription error: {}", e);
        HandlerError::from(e)
    })?;

    let processing_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    info!("Transcription completed: '{}'", preview(&text));
    info!("Processing time: {}ms", processing_time_ms);

    Ok(TranscriptionResponse {
        text,
        model_used: TRANSCRIPTION_MODEL.to_string(),
        processing_time_ms,
        estimated_cost: estimate.cost,
        estimated_minutes: estimate.minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingTranscriber {
        seen: Mutex<Vec<(PathBuf, bool)>>,
    }

    #[async_trait]
    impl Transcriber for RecordingTranscriber {
        async fn transcribe(&self, file: &Path, _model: &str) -> Result<String, TranscriberError> {
            self.seen
                .lock()
                .unwrap()
                .push((file.to_path_buf(), file.exists()));
            Ok("hello world".to_string())
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        async fn transcribe(&self, _file: &Path, _model: &str) -> Result<String, TranscriberError> {
            Err(TranscriberError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }
    }

    /// Completes after a delay and records that it finished
    struct DelayedTranscriber {
        delay: Duration,
        finished: AtomicBool,
    }

    #[async_trait]
    impl Transcriber for DelayedTranscriber {
        async fn transcribe(&self, file: &Path, _model: &str) -> Result<String, TranscriberError> {
            tokio::time::sleep(self.delay).await;
            assert!(file.exists(), "file must outlive the dropped request");
            self.finished.store(true, Ordering::SeqCst);
            Ok("finished anyway".to_string())
        }
    }

    struct SlowTranscriber;

    #[async_trait]
    impl Transcriber for SlowTranscriber {
        async fn transcribe(&self, _file: &Path, _model: &str) -> Result<String, TranscriberError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn upload(name: Option<&str>, data: &[u8]) -> UploadedAudio {
        UploadedAudio {
            data: data.to_vec(),
            filename: name.map(String::from),
            content_type: None,
        }
    }

    fn config_in(dir: &Path) -> ApiConfig {
        ApiConfig {
            temp_dir: dir.to_path_buf(),
            transcription_timeout: Duration::from_millis(100),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_validate_upload_order() {
        // Format is checked before emptiness
        assert!(matches!(
            validate_upload(&upload(Some("a.txt"), b"")),
            Err(HandlerError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            validate_upload(&upload(Some("a.mp3"), b"")),
            Err(HandlerError::EmptyAudioFile)
        ));
        assert_eq!(validate_upload(&upload(None, b"x")).unwrap(), ".m4a");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "é".repeat(80);
        assert_eq!(preview(&text).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn test_success_stages_then_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let transcriber = Arc::new(RecordingTranscriber {
            seen: Mutex::new(Vec::new()),
        });

        let response = transcribe_upload(
            upload(Some("memo.WAV"), &[1u8; 1024 * 1024]),
            &config_in(dir.path()),
            transcriber.clone(),
        )
        .await
        .expect("transcription succeeds");

        assert_eq!(response.text, "hello world");
        assert_eq!(response.model_used, "gpt-4o-mini-transcribe");
        assert_eq!(response.estimated_minutes, 2.0);
        assert_eq!(response.estimated_cost, 0.006);

        let seen = transcriber.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, existed) = &seen[0];
        assert!(*existed, "file must exist during the call");
        assert!(path.to_string_lossy().ends_with(".wav"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failure_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcribe_upload(
            upload(Some("memo.mp3"), b"ID3"),
            &config_in(dir.path()),
            Arc::new(FailingTranscriber),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HandlerError::TranscriptionFailed(_)));
        assert!(err.to_string().contains("service unavailable"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_a_transcription_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcribe_upload(
            upload(Some("memo.ogg"), b"OggS"),
            &config_in(dir.path()),
            Arc::new(SlowTranscriber),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HandlerError::TranscriptionFailed(_)));
        assert!(err.to_string().contains("did not respond"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_upload_stages_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcribe_upload(
            upload(Some("memo.webm"), b""),
            &config_in(dir.path()),
            Arc::new(FailingTranscriber),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HandlerError::EmptyAudioFile));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_request_still_finishes_call_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            transcription_timeout: Duration::from_secs(5),
            ..config_in(dir.path())
        };
        let transcriber = Arc::new(DelayedTranscriber {
            delay: Duration::from_millis(200),
            finished: AtomicBool::new(false),
        });

        // The handler future is dropped mid-call, as on a client disconnect
        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            transcribe_upload(
                upload(Some("memo.mp3"), b"ID3"),
                &config,
                transcriber.clone(),
            ),
        )
        .await
        .is_err();
        assert!(dropped);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(transcriber.finished.load(Ordering::SeqCst));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
