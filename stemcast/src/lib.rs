//! # stemcast: Media Upload & Audio Extraction Service
//!
//! `stemcast` is a small HTTP service that accepts uploaded media files, stores them on local
//! disk, and derives a normalized audio track (mono, 16 kHz, signed 16-bit little-endian PCM WAV)
//! from each upload by shelling out to an external transcoder. Both the original file and the
//! derived audio are then retrievable by name.
//!
//! ## Overview
//!
//! The service exists to feed audio pipelines that want one canonical input format regardless of
//! what clients record: screen captures, phone videos, voice memos. A client uploads whatever it
//! has, and the service hands back the name of a WAV file normalized for speech processing.
//!
//! Control flow is strictly linear per request. `POST /upload` writes the payload to the uploads
//! directory, invokes the transcoder, waits for it to finish, and reports both outcomes in a
//! single response. There are no job queues, no background workers and no database; the
//! filesystem is the only state.
//!
//! ### Request Flow
//!
//! An upload passes through four steps: multipart parsing (the payload arrives in a `file`
//! field), persistence into the uploads directory, synchronous audio extraction into the audio
//! directory, and a combined response. A failed extraction is reported in the response body but
//! never fails the upload; the original file remains stored and retrievable either way.
//!
//! Retrieval (`GET /uploads/{filename}`, `GET /audio/{filename}`) streams the file's bytes back
//! with a guessed content type. A missing file is reported with a `File not found` body rather
//! than a 404 status, which existing clients depend on.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) holds the route handlers and the response models. The **media
//! store** ([`storage`]) owns the two directories and the file-name discipline, including the
//! rule for deriving a WAV name from an upload name. The **extractor** ([`extractor`]) is the
//! seam to the external transcoder: a narrow async trait with an ffmpeg-backed implementation,
//! mockable in tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use stemcast::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = stemcast::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     stemcast::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod extractor;
mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use config::CorsOrigin;
use extractor::{AudioExtractor, FfmpegExtractor};
use openapi::ApiDoc;
use storage::MediaStore;

/// Application state shared across all request handlers.
///
/// Everything in here is immutable for the lifetime of the process: the
/// loaded configuration, the media store handle, and the extractor. Handlers
/// never share mutable in-memory state; concurrent uploads meet only at the
/// filesystem.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: MediaStore,
    pub extractor: Arc<dyn AudioExtractor>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.cors;
    let wildcard = cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));

    let mut layer = if wildcard && cors.allow_credentials {
        // The Fetch spec forbids the literal `*` together with credentials,
        // so a credentialed wildcard reflects whatever the request carries
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else if wildcard {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url renders with a trailing slash; origin headers carry none
                let header_value = url.as_str().trim_end_matches('/').parse::<HeaderValue>()?;
                origins.push(header_value);
            }
        }
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(cors.allow_credentials)
    };

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(layer)
}

/// Build the main application router with all endpoints and middleware.
///
/// This constructs the complete Axum router with:
/// - The liveness greeting, upload and retrieval routes
/// - Interactive API docs at `/docs` (plus the raw document at `/docs/openapi.json`)
/// - CORS configuration
/// - Optional Prometheus metrics at `/internal/metrics`
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration contains an origin that is not
/// a valid header value.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/", get(api::handlers::health::greeting))
        .route(
            "/upload",
            // Payloads are whole media files; no request body cap
            post(api::handlers::media::upload_media).layer(DefaultBodyLimit::disable()),
        )
        .route("/uploads/{filename}", get(api::handlers::media::get_uploaded_file))
        .route("/audio/{filename}", get(api::handlers::media::get_audio_file))
        .with_state(state.clone())
        .route("/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] creates the media directories and
///    builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create an application using the transcoder named in the configuration.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let extractor: Arc<dyn AudioExtractor> = Arc::new(FfmpegExtractor::new(&config.extractor));
        Self::with_extractor(config, extractor).await
    }

    /// Create an application with a caller-supplied extractor.
    pub async fn with_extractor(config: Config, extractor: Arc<dyn AudioExtractor>) -> anyhow::Result<Self> {
        debug!("Starting media service with configuration: {:#?}", config);

        // Directory creation failure is fatal to startup
        let store = MediaStore::open(&config.storage).with_context(|| {
            format!(
                "Failed to create media directories {} and {}",
                config.storage.uploads_dir.display(),
                config.storage.audio_dir.display()
            )
        })?;

        let state = AppState::builder().config(config.clone()).store(store).extractor(extractor).build();
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Media service listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        Ok(())
    }
}
