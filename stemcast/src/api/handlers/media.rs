//! Upload and retrieval handlers for media files and derived audio.

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::AppState;
use crate::api::models::media::{FileNotFound, UploadResponse};
use crate::errors::{Error, Result};
use crate::storage::Filename;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "media",
    summary = "Upload media file",
    description = "Stores the uploaded file and synchronously derives a mono 16kHz signed 16-bit \
                   PCM WAV track from it. The response reports both outcomes independently; a \
                   failed extraction does not fail the upload.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with the media payload in a `file` field"
    ),
    responses(
        (status = 200, description = "File stored; `audio_status` carries the extraction outcome", body = UploadResponse),
        (status = 400, description = "Missing file field, missing file name, or invalid file name"),
        (status = 500, description = "Failed to persist the upload")
    )
)]
pub async fn upload_media(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let mut upload: Option<(Filename, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        // Fields other than `file` are ignored
        if field.name() != Some("file") {
            continue;
        }

        let raw_name = field.file_name().ok_or_else(|| Error::BadRequest {
            message: "Missing file name in file field".to_string(),
        })?;
        let filename = Filename::new(raw_name).map_err(|e| Error::BadRequest {
            message: format!("Invalid file name: {}", e),
        })?;

        let data = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read file data: {}", e),
        })?;

        upload = Some((filename, data));
    }

    let Some((filename, data)) = upload else {
        return Err(Error::BadRequest {
            message: "Missing file field in multipart data".to_string(),
        });
    };

    let size_bytes = data.len();
    let source = state.store.save_upload(&filename, data).await.map_err(|e| Error::Storage {
        operation: format!("write upload {}", filename),
        source: e,
    })?;

    tracing::debug!(
        filename = %filename,
        path = %source.display(),
        size_bytes = size_bytes,
        "Stored upload"
    );

    let audio_file = filename.derived_wav();
    let dest = state.store.audio_path(&audio_file);

    let extraction = state.extractor.extract(&source, &dest).await;
    match &extraction {
        Ok(()) => {
            tracing::info!(filename = %filename, audio_file = %audio_file, "Audio extracted");
        }
        Err(e) => {
            tracing::warn!(filename = %filename, error = %e, "Audio extraction failed");
        }
    }

    Ok(Json(UploadResponse::new(&filename, &audio_file, extraction)))
}

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "media",
    summary = "Download original upload",
    params(
        ("filename" = String, Path, description = "Name the file was uploaded under")
    ),
    responses(
        (status = 200, description = "File contents, or a `File not found` body when the file is missing")
    )
)]
pub async fn get_uploaded_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match Filename::new(&filename) {
        Ok(name) => serve_file(&state.store.upload_path(&name)).await,
        // Names we refuse to resolve read the same as missing files
        Err(_) => not_found(),
    }
}

#[utoipa::path(
    get,
    path = "/audio/{filename}",
    tag = "media",
    summary = "Download derived audio",
    params(
        ("filename" = String, Path, description = "Name of the derived WAV file, as reported by the upload response")
    ),
    responses(
        (status = 200, description = "WAV contents, or a `File not found` body when the file is missing")
    )
)]
pub async fn get_audio_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match Filename::new(&filename) {
        Ok(name) => serve_file(&state.store.audio_path(&name)).await,
        Err(_) => not_found(),
    }
}

/// Stream a file's bytes with a content type guessed from its name.
async fn serve_file(path: &std::path::Path) -> Response {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(_) => return not_found(),
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    ([(header::CONTENT_TYPE, mime.as_ref())], body).into_response()
}

/// Missing files are reported in the body, not the status line.
fn not_found() -> Response {
    Json(FileNotFound::body()).into_response()
}
