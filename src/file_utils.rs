// File utilities for PolyVoice API
//
// This module stages uploaded audio on disk for the transcription service and
// guarantees the staged file is removed once it is no longer needed.

use log::{debug, error};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Prefix for staged file names
pub const STAGED_FILE_PREFIX: &str = "polyvoice";

/// Builds a unique staging path `<base_dir>/<prefix>_<uuid><extension>`
///
/// `extension` is expected to be dot-prefixed.
pub fn generate_unique_path(base_dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let filename = format!("{}_{}{}", prefix, Uuid::new_v4(), extension);
    base_dir.join(filename)
}

/// Writes data to a new file, failing if the path already exists
pub fn save_file_data(data: &[u8], file_path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(file_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

/// Removes a file, treating an already missing file as success
///
/// Errors are logged, not returned.
pub fn cleanup_file(file_path: &Path) {
    match fs::remove_file(file_path) {
        Ok(()) => debug!("Temporary file cleaned up: {}", file_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => error!("Failed to clean up file {}: {}", file_path.display(), e),
    }
}

/// An uploaded file staged on disk, removed when dropped
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Writes `data` to a uniquely named file in `base_dir`
    pub fn create(base_dir: &Path, extension: &str, data: &[u8]) -> io::Result<Self> {
        let path = generate_unique_path(base_dir, STAGED_FILE_PREFIX, extension);
        Self::write_at(path, data)
    }

    fn write_at(path: PathBuf, data: &[u8]) -> io::Result<Self> {
        if let Err(e) = save_file_data(data, &path) {
            // A partial write may have left the file behind; an existing file is not ours
            if e.kind() != io::ErrorKind::AlreadyExists {
                cleanup_file(&path);
            }
            return Err(e);
        }
        debug!("Saved to temporary file: {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        cleanup_file(&self.path);
    }
}
