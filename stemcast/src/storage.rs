//! Filesystem layout for uploaded media and derived audio.
//!
//! The store is two flat directories: one holding uploads exactly as they
//! arrived, one holding the WAV tracks derived from them. Files are keyed by
//! name alone; re-using a name overwrites the previous contents, and nothing
//! is ever deleted.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use thiserror::Error;

use crate::config::StorageConfig;

/// A validated client-supplied file name.
///
/// Names become path components inside the media store, so anything that
/// could resolve outside the store directories is rejected up front: empty
/// names, path separators, NUL bytes and the bare `.`/`..` components.
/// Everything else, including dot-prefixed and extension-less names, passes
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filename(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilenameError {
    #[error("file name is empty")]
    Empty,
    #[error("file name contains a path separator")]
    Separator,
    #[error("file name is a relative path component")]
    Traversal,
}

impl Filename {
    pub fn new(name: &str) -> Result<Self, FilenameError> {
        if name.is_empty() {
            return Err(FilenameError::Empty);
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(FilenameError::Separator);
        }
        if name == "." || name == ".." {
            return Err(FilenameError::Traversal);
        }
        Ok(Self(name.to_string()))
    }

    /// Name of the WAV file derived from this upload.
    ///
    /// The final `.`-delimited extension segment is replaced with `.wav`; a
    /// name with no `.` gets `.wav` appended whole. So `talk.mp4` derives
    /// `talk.wav`, `archive.tar.gz` derives `archive.tar.wav` and `clip`
    /// derives `clip.wav`.
    pub fn derived_wav(&self) -> Filename {
        let stem = match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => self.0.as_str(),
        };
        Filename(format!("{stem}.wav"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to the upload and audio directories.
///
/// Both directories are created (with any missing parents) when the store is
/// opened; a failure there aborts startup. The handle itself is cheap to
/// clone and lives in the shared application state.
#[derive(Debug, Clone)]
pub struct MediaStore {
    uploads_dir: PathBuf,
    audio_dir: PathBuf,
}

impl MediaStore {
    /// Create the store directories and return a handle to them.
    ///
    /// Idempotent across restarts: existing directories and their contents
    /// are left untouched.
    pub fn open(config: &StorageConfig) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.uploads_dir)?;
        std::fs::create_dir_all(&config.audio_dir)?;
        Ok(Self {
            uploads_dir: config.uploads_dir.clone(),
            audio_dir: config.audio_dir.clone(),
        })
    }

    pub fn upload_path(&self, name: &Filename) -> PathBuf {
        self.uploads_dir.join(name.as_str())
    }

    pub fn audio_path(&self, name: &Filename) -> PathBuf {
        self.audio_dir.join(name.as_str())
    }

    /// Write an upload payload, replacing any previous file with the same
    /// name, and return the path it was stored at.
    pub async fn save_upload(&self, name: &Filename, data: Bytes) -> std::io::Result<PathBuf> {
        let path = self.upload_path(name);
        tokio::fs::write(&path, &data).await?;
        Ok(path)
    }
}
