//! Request-scoped scratch directories.
//!
//! A [`ScratchWorkspace`] owns every intermediate artifact of one request.
//! The directory is removed when the value is dropped, on every exit path,
//! and removal failures are logged rather than returned.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "qclip-";

/// Downloaded background photo.
pub const BACKGROUND_FILE: &str = "background.jpg";
/// Composed still with the quote overlay.
pub const STILL_FILE: &str = "quote_image.jpg";
/// Synthesized narration.
pub const AUDIO_FILE: &str = "audio.mp3";
/// Encoded clip.
pub const OUTPUT_FILE: &str = "output.mp4";

/// Exclusively owned temporary directory for one pipeline run.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchWorkspace {
    /// Create a uniquely named workspace under `root`.
    pub fn create(root: impl AsRef<Path>) -> MediaResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)?;
        let path = dir.path().to_path_buf();

        debug!(workspace = %path.display(), "Created scratch workspace");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn background_path(&self) -> PathBuf {
        self.path.join(BACKGROUND_FILE)
    }

    pub fn still_path(&self) -> PathBuf {
        self.path.join(STILL_FILE)
    }

    pub fn audio_path(&self) -> PathBuf {
        self.path.join(AUDIO_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.path.join(OUTPUT_FILE)
    }

    /// Read the encoded clip, failing if it is missing or empty.
    pub async fn read_output(&self) -> MediaResult<Vec<u8>> {
        let output = self.output_path();

        let metadata = match fs::metadata(&output).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::FileNotFound(output));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(MediaError::FileNotFound(output));
        }

        Ok(fs::read(&output).await?)
    }

    /// Remove the workspace now.
    ///
    /// Equivalent to dropping it; provided so call sites read explicitly.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match dir.close() {
            Ok(()) => debug!(workspace = %self.path.display(), "Removed scratch workspace"),
            Err(e) => warn!(
                workspace = %self.path.display(),
                error = %e,
                "Failed to remove scratch workspace"
            ),
        }
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        self.release();
    }
}
