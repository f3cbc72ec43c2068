use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::extractor::TranscodeError;
use crate::storage::Filename;

/// Combined result of an upload and its synchronous audio extraction.
///
/// The two outcomes are reported independently: `message` covers the upload
/// itself, `audio_status` covers the extraction. An extraction failure never
/// fails the upload, so this body always arrives with a 200 status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Upload outcome banner
    #[schema(example = "File uploaded successfully!")]
    pub message: String,
    /// Name the file was stored under
    #[schema(example = "talk.mp4")]
    pub filename: String,
    /// Name of the derived WAV file
    #[schema(example = "talk.wav")]
    pub audio_file: String,
    /// Extraction outcome, either success or a failure description
    #[schema(example = "Audio extracted successfully!")]
    pub audio_status: String,
}

impl UploadResponse {
    pub fn new(filename: &Filename, audio_file: &Filename, extraction: Result<(), TranscodeError>) -> Self {
        let audio_status = match extraction {
            Ok(()) => "Audio extracted successfully!".to_string(),
            Err(e) => format!("Audio extraction failed: {e}"),
        };

        Self {
            message: "File uploaded successfully!".to_string(),
            filename: filename.to_string(),
            audio_file: audio_file.to_string(),
            audio_status,
        }
    }
}

/// Body returned when a requested file does not exist.
///
/// Retrieval misses are reported in the body with a 200 status, not a 404,
/// so clients must check for this shape before treating a response as file
/// content.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileNotFound {
    /// Always `File not found`
    #[schema(example = "File not found")]
    pub error: String,
}

impl FileNotFound {
    pub fn body() -> Self {
        Self {
            error: "File not found".to_string(),
        }
    }
}
