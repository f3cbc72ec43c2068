//! Test utilities shared across handler and integration tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use tempfile::TempDir;

use crate::config::{Config, CorsConfig, ExtractorConfig, StorageConfig};
use crate::extractor::{AudioExtractor, TranscodeError};

/// Build an application over a throwaway media root and hand back its test
/// server. The `TempDir` must be kept alive for the duration of the test.
pub async fn create_test_app(extractor: Arc<dyn AudioExtractor>) -> (TestServer, Config, TempDir) {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(root.path());

    let app = crate::Application::with_extractor(config.clone(), extractor)
        .await
        .expect("Failed to create application");

    (app.into_test_server(), config, root)
}

pub fn create_test_config(root: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage: StorageConfig {
            uploads_dir: root.join("uploads"),
            audio_dir: root.join("audio"),
        },
        extractor: ExtractorConfig::default(),
        cors: CorsConfig::default(),
        // The Prometheus recorder is process-global; keep it out of tests
        enable_metrics: false,
    }
}

/// Extractor that writes fixed bytes to the destination, standing in for a
/// working transcoder.
pub struct FixedOutputExtractor {
    wav_bytes: Vec<u8>,
}

impl FixedOutputExtractor {
    pub fn new(wav_bytes: Vec<u8>) -> Self {
        Self { wav_bytes }
    }
}

impl Default for FixedOutputExtractor {
    fn default() -> Self {
        Self::new(b"RIFF stub WAVE".to_vec())
    }
}

#[async_trait]
impl AudioExtractor for FixedOutputExtractor {
    async fn extract(&self, _source: &Path, dest: &Path) -> Result<(), TranscodeError> {
        tokio::fs::write(dest, &self.wav_bytes).await.map_err(|e| TranscodeError::Spawn {
            program: "fixed-output".to_string(),
            source: e,
        })
    }
}

/// Extractor that always fails, the way a missing transcoder binary would.
pub struct FailingExtractor;

#[async_trait]
impl AudioExtractor for FailingExtractor {
    async fn extract(&self, _source: &Path, _dest: &Path) -> Result<(), TranscodeError> {
        Err(TranscodeError::Spawn {
            program: "ffmpeg".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        })
    }
}
