//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `STEMCAST_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`, missing file is fine)
//! 2. **Environment variables** - Variables prefixed with `STEMCAST_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `STEMCAST_STORAGE__UPLOADS_DIR=/data/uploads` sets the `storage.uploads_dir` field.
//!
//! ## Configuration Structure
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 8000
//! storage:
//!   uploads_dir: app/uploads
//!   audio_dir: app/audio
//! extractor:
//!   program: ffmpeg
//! cors:
//!   allowed_origins: ["*"]
//!   allow_credentials: true
//! enable_metrics: true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "STEMCAST_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Media store directories
    pub storage: StorageConfig,
    /// External transcoder settings
    pub extractor: ExtractorConfig,
    /// CORS settings for browser clients
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
}

/// Directories backing the media store.
///
/// Relative paths resolve against the working directory. Both directories
/// are created on startup if missing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory for uploaded files
    pub uploads_dir: PathBuf,
    /// Directory for derived audio files
    pub audio_dir: PathBuf,
}

/// External transcoder invocation settings.
///
/// Only the program is configurable. The transcode parameters (strip video,
/// mono, 16 kHz, signed 16-bit PCM) are fixed and not exposed here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Transcoder binary, resolved via PATH when not an absolute path
    pub program: PathBuf,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            storage: StorageConfig::default(),
            extractor: ExtractorConfig::default(),
            cors: CorsConfig::default(),
            enable_metrics: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("app/uploads"),
            audio_dir: PathBuf::from("app/audio"),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl Default for CorsConfig {
    /// Wide open for development frontends; narrow the origins for production
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: true,
            max_age: None,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("STEMCAST_").split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: cors.allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        if self.storage.uploads_dir.as_os_str().is_empty() || self.storage.audio_dir.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: storage.uploads_dir and storage.audio_dir cannot be empty.".to_string(),
            });
        }

        if self.extractor.program.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: extractor.program cannot be empty.".to_string(),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|_jail| {
            let args = Args {
                config: "missing.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8000);
            assert_eq!(config.storage.uploads_dir, PathBuf::from("app/uploads"));
            assert_eq!(config.storage.audio_dir, PathBuf::from("app/audio"));
            assert_eq!(config.extractor.program, PathBuf::from("ffmpeg"));
            assert!(config.enable_metrics);
            assert!(config.cors.allow_credentials);
            assert!(matches!(config.cors.allowed_origins[..], [CorsOrigin::Wildcard]));

            Ok(())
        });
    }

    #[test]
    fn test_yaml_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 9000
storage:
  uploads_dir: /data/uploads
extractor:
  program: /opt/ffmpeg/bin/ffmpeg
cors:
  allowed_origins:
    - "*"
    - https://app.example.com
  allow_credentials: false
  max_age: 3600
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.port, 9000);
            assert_eq!(config.storage.uploads_dir, PathBuf::from("/data/uploads"));
            // Unset nested fields keep their defaults
            assert_eq!(config.storage.audio_dir, PathBuf::from("app/audio"));
            assert_eq!(config.extractor.program, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
            assert!(!config.cors.allow_credentials);
            assert_eq!(config.cors.max_age, Some(3600));
            assert_eq!(config.cors.allowed_origins.len(), 2);
            assert!(matches!(config.cors.allowed_origins[0], CorsOrigin::Wildcard));
            match &config.cors.allowed_origins[1] {
                CorsOrigin::Url(url) => assert_eq!(url.as_str(), "https://app.example.com/"),
                other => panic!("expected URL origin, got {other:?}"),
            }

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 10.0.0.1
port: 9000
"#,
            )?;

            jail.set_env("STEMCAST_PORT", "8080");
            jail.set_env("STEMCAST_STORAGE__AUDIO_DIR", "/var/lib/stemcast/audio");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            // Env vars should override
            assert_eq!(config.port, 8080);
            assert_eq!(config.storage.audio_dir, PathBuf::from("/var/lib/stemcast/audio"));

            // YAML values should be preserved
            assert_eq!(config.host, "10.0.0.1");

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 9000
transcoder: ffmpeg
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            assert!(Config::load(&args).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_empty_origins_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "cors:\n  allowed_origins: []\n")?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            assert!(Config::load(&args).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8000,
            ..Default::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }
}
