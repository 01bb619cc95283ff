//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use qclip_media::command::DEFAULT_FFMPEG_BINARY;
use qclip_media::FontPaths;
use qclip_models::EncodingConfig;
use qclip_upstream::{PhotoClientConfig, SpeechClientConfig, UpstreamError};
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Missing(String),
}

impl From<UpstreamError> for ConfigError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingConfig(msg) => ConfigError::Missing(msg),
            other => ConfigError::Missing(other.to_string()),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Whether `/metrics` is served
    pub metrics_enabled: bool,
    /// Photo search client settings
    pub photos: PhotoClientConfig,
    /// Speech synthesis client settings
    pub speech: SpeechClientConfig,
    /// Overlay font files
    pub fonts: FontPaths,
    /// FFmpeg binary name or path
    pub ffmpeg_path: String,
    /// Bound on one encoder run
    pub encode_timeout: Duration,
    /// Encoder output settings
    pub encoding: EncodingConfig,
    /// Directory under which per-request workspaces are created
    pub scratch_root: PathBuf,
}

impl ApiConfig {
    /// Config with defaults for everything except the photo client.
    pub fn new(photos: PhotoClientConfig) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            metrics_enabled: true,
            photos,
            speech: SpeechClientConfig::default(),
            fonts: FontPaths::default(),
            ffmpeg_path: DEFAULT_FFMPEG_BINARY.to_string(),
            encode_timeout: Duration::from_secs(120),
            encoding: EncodingConfig::default(),
            scratch_root: std::env::temp_dir(),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    ///
    /// Fails when `PEXELS_API_KEY` is absent or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let photos = PhotoClientConfig::from_lookup(&lookup)?;
        let defaults = Self::new(photos);

        let fonts = FontPaths {
            quote: lookup("QUOTE_FONT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fonts.quote.clone()),
            attribution: lookup("AUTHOR_FONT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fonts.attribution.clone()),
        };

        Ok(Self {
            host: lookup("API_HOST").unwrap_or(defaults.host.clone()),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins.clone()),
            max_body_size: lookup("MAX_BODY_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment.clone()),
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            speech: SpeechClientConfig::from_lookup(&lookup),
            fonts,
            ffmpeg_path: lookup("FFMPEG_PATH")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.ffmpeg_path.clone()),
            encode_timeout: lookup("ENCODE_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.encode_timeout),
            scratch_root: lookup("SCRATCH_DIR")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_root.clone()),
            ..defaults
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
