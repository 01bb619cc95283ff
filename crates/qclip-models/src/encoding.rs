//! Canvas, typography and encoding settings.

use serde::{Deserialize, Serialize};

/// Output canvas width in pixels
pub const CANVAS_WIDTH: u32 = 1920;
/// Output canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 1080;

/// Maximum rendered width of a quote line
pub const MAX_LINE_WIDTH: u32 = 1600;
/// Vertical advance between quote lines
pub const LINE_HEIGHT: u32 = 90;
/// Extra space reserved under the quote block for the attribution
pub const ATTRIBUTION_RESERVE: u32 = 100;
/// Gap between the last quote line and the attribution
pub const ATTRIBUTION_GAP: i32 = 20;
/// Drop shadow offset for quote lines
pub const QUOTE_SHADOW_OFFSET: i32 = 3;
/// Drop shadow offset for the attribution
pub const ATTRIBUTION_SHADOW_OFFSET: i32 = 2;

/// Quote font size in pixels
pub const QUOTE_FONT_SIZE: f32 = 70.0;
/// Attribution font size in pixels
pub const ATTRIBUTION_FONT_SIZE: f32 = 50.0;
/// Default quote font
pub const DEFAULT_QUOTE_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
/// Default attribution font
pub const DEFAULT_AUTHOR_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// JPEG quality for the composed still
pub const STILL_JPEG_QUALITY: u8 = 95;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Encoder tuning for a single held frame
pub const DEFAULT_TUNE: &str = "stillimage";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";
/// Pixel format accepted by most players
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Hard cap on output duration
pub const MAX_DURATION_SECS: u32 = 15;

/// MIME type of the delivered clip
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";
/// Attachment name of the delivered clip
pub const OUTPUT_FILENAME: &str = "quote_video.mp4";

/// Encoder settings for still-loop clips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Codec tuning profile
    #[serde(default = "default_tune")]
    pub tune: String,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Output duration cap in seconds
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u32,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_tune() -> String {
    DEFAULT_TUNE.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_max_duration() -> u32 {
    MAX_DURATION_SECS
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_video_codec(),
            tune: default_tune(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            pixel_format: default_pixel_format(),
            max_duration_secs: MAX_DURATION_SECS,
        }
    }
}

impl EncodingConfig {
    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-tune".to_string(),
            self.tune.clone(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-shortest".to_string(),
            "-t".to_string(),
            self.max_duration_secs.to_string(),
        ]
    }
}
