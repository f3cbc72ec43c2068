//! OpenAPI documentation for the HTTP surface.
//!
//! The generated document is served interactively at `/docs` and as raw JSON
//! at `/docs/openapi.json`.

use utoipa::OpenApi;

use crate::api;
use crate::api::models::health::Greeting;
use crate::api::models::media::{FileNotFound, UploadResponse};

/// OpenAPI document covering every route the service exposes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "stemcast",
        description = "Media upload service that stores files and derives mono 16kHz signed \
                       16-bit PCM WAV audio from them via an external transcoder."
    ),
    paths(
        api::handlers::health::greeting,
        api::handlers::media::upload_media,
        api::handlers::media::get_uploaded_file,
        api::handlers::media::get_audio_file,
    ),
    components(schemas(Greeting, UploadResponse, FileNotFound)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "media", description = "Upload and retrieval of media files and derived audio")
    )
)]
pub struct ApiDoc;
