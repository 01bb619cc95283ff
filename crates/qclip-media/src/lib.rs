//! Media building blocks for quote clips.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with a bounded runner
//! - Progress parsing from `-progress pipe:2`
//! - Still-loop encoding of an image over narration audio
//! - The quote overlay renderer with built-in font fallback
//! - Request-scoped scratch workspaces that always clean up

pub mod command;
pub mod error;
pub mod mux;
pub mod overlay;
pub mod probe;
pub mod progress;
pub mod workspace;

pub use command::{check_ffprobe, resolve_binary, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use mux::{encode_still_loop, expected_output_ms, still_loop_command};
pub use overlay::{wrap_text, FontPaths, FontSet, OverlayRenderer, RenderOutcome, Typeface};
pub use probe::{probe_media, MediaInfo};
pub use progress::FfmpegProgress;
pub use workspace::ScratchWorkspace;
