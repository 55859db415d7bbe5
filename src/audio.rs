// Uploaded audio and format handling
//
// This module holds the request-scoped upload value and the rules that decide
// which file extensions are accepted.

use std::path::Path;

use crate::error::HandlerError;

/// Supported audio extensions, dot-prefixed and lower-case
pub const SUPPORTED_FORMATS: [&str; 5] = [".m4a", ".mp3", ".wav", ".ogg", ".webm"];

/// Extension assumed when the upload carries none
pub const DEFAULT_EXTENSION: &str = ".m4a";

/// Audio bytes received in a single upload
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl UploadedAudio {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolves the staging extension for this upload
    pub fn extension(&self) -> Result<&'static str, HandlerError> {
        resolve_extension(self.filename.as_deref())
    }
}

/// Comma separated list of supported formats, for error messages
pub fn supported_formats_list() -> String {
    SUPPORTED_FORMATS.join(", ")
}

/// Maps a declared filename to a supported, dot-prefixed extension
///
/// The extension is the text after the last `.` of the file name, so `.mp3` is an
/// MP3 upload. A missing filename or a name without any `.` resolves to `.m4a`.
/// Matching is case-insensitive.
pub fn resolve_extension(filename: Option<&str>) -> Result<&'static str, HandlerError> {
    let extension = filename
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| {
            name.to_string_lossy()
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
        })
        .filter(|ext| !ext.is_empty());

    let Some(extension) = extension else {
        return Ok(DEFAULT_EXTENSION);
    };

    let dotted = format!(".{}", extension);
    SUPPORTED_FORMATS
        .iter()
        .find(|supported| **supported == dotted)
        .copied()
        .ok_or(HandlerError::UnsupportedFormat(dotted))
}

/// MIME type sent to the transcription service for a supported extension
pub fn mime_type(extension: &str) -> &'static str {
    match extension.trim_start_matches('.') {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "audio/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_resolve() {
        for ext in SUPPORTED_FORMATS {
            let name = format!("clip{}", ext);
            assert_eq!(resolve_extension(Some(&name)).unwrap(), ext);
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(resolve_extension(Some("VOICE.MP3")).unwrap(), ".mp3");
        assert_eq!(resolve_extension(Some("memo.WebM")).unwrap(), ".webm");
    }

    #[test]
    fn test_missing_extension_defaults_to_m4a() {
        assert_eq!(resolve_extension(None).unwrap(), ".m4a");
        assert_eq!(resolve_extension(Some("recording")).unwrap(), ".m4a");
        assert_eq!(resolve_extension(Some("")).unwrap(), ".m4a");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        match resolve_extension(Some("notes.txt")) {
            Err(HandlerError::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(resolve_extension(Some("archive.tar.gz")).is_err());
    }

    #[test]
    fn test_dot_prefixed_names_use_their_extension() {
        assert_eq!(resolve_extension(Some(".mp3")).unwrap(), ".mp3");
        assert_eq!(resolve_extension(Some(".WAV")).unwrap(), ".wav");
        match resolve_extension(Some(".txt")) {
            Err(HandlerError::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type(".mp3"), "audio/mpeg");
        assert_eq!(mime_type(".m4a"), "audio/mp4");
        assert_eq!(mime_type("wav"), "audio/wav");
    }
}
