//! Audio extraction via an external transcoder.
//!
//! Extraction is a single shell-out per upload: the configured program
//! (ffmpeg by default) is run to completion with a fixed argument list and
//! its exit status decides the outcome. There is no queueing, retry or
//! timeout; callers hold the request open while the child runs.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ExtractorConfig;

/// Error from a single transcoder invocation.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The transcoder could not be started at all (missing binary, bad path).
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The transcoder ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {detail}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        detail: String,
    },
}

/// Derives an audio track from a stored media file.
///
/// Implementations turn the file at `source` into a mono 16 kHz signed
/// 16-bit little-endian PCM WAV at `dest`, resolving only once the work has
/// finished.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract(&self, source: &Path, dest: &Path) -> Result<(), TranscodeError>;
}

/// [`AudioExtractor`] backed by an ffmpeg-compatible command line program.
///
/// The transcode parameters are fixed; only the program itself comes from
/// configuration, so deployments can point at a specific binary without
/// changing what it is asked to do.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: PathBuf,
}

impl FfmpegExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            program: config.program.clone(),
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract(&self, source: &Path, dest: &Path) -> Result<(), TranscodeError> {
        // -y replaces an existing output file instead of prompting on a
        // non-tty stdin, so re-uploading a name refreshes its audio track
        let output = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(source)
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| TranscodeError::Spawn {
                program: self.program_name(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                program: self.program_name(),
                status: output.status,
                detail: stderr_tail(&output.stderr),
            });
        }

        Ok(())
    }
}

/// Last few stderr lines, where ffmpeg puts the actual failure reason.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let mut tail: Vec<&str> = text.lines().rev().take(3).collect();
    tail.reverse();
    tail.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(program: &str) -> FfmpegExtractor {
        FfmpegExtractor::new(&ExtractorConfig {
            program: PathBuf::from(program),
        })
    }

    #[test]
    fn stderr_tail_keeps_last_lines_in_order() {
        assert_eq!(stderr_tail(b""), "");
        assert_eq!(stderr_tail(b"only line\n"), "only line");
        assert_eq!(stderr_tail(b"one\ntwo\nthree\nfour\n"), "two | three | four");
    }

    #[test_log::test(tokio::test)]
    async fn missing_program_reports_spawn_error() {
        let extractor = extractor("definitely-not-a-real-transcoder");
        let err = extractor
            .extract(Path::new("in.mp4"), Path::new("out.wav"))
            .await
            .unwrap_err();

        match err {
            TranscodeError::Spawn { program, .. } => {
                assert_eq!(program, "definitely-not-a-real-transcoder");
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn nonzero_exit_reports_failure() {
        // `false` ignores its arguments and exits 1
        let extractor = extractor("false");
        let err = extractor
            .extract(Path::new("in.mp4"), Path::new("out.wav"))
            .await
            .unwrap_err();

        match err {
            TranscodeError::Failed { status, .. } => assert!(!status.success()),
            other => panic!("expected failure error, got {other:?}"),
        }
    }
}
