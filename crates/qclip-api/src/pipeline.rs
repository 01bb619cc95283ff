//! Quote video generation pipeline.
//!
//! One run fetches a background photo, draws the quote over it, synthesizes
//! the narration and encodes the still and the narration into an MP4. Every
//! intermediate file lives in a [`ScratchWorkspace`] that is removed when the
//! run ends, whether it succeeds, fails, or is cancelled.

use std::path::{Path, PathBuf};
use std::time::Instant;

use qclip_media::{encode_still_loop, FfmpegRunner, OverlayRenderer, ScratchWorkspace};
use qclip_models::{EncodingConfig, QuoteRequest};
use qclip_upstream::{PhotoClient, SpeechClient, UpstreamResult};
use tracing::Instrument;

use crate::config::ApiConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RequestLogger;
use crate::metrics;

/// Encoded clip ready to be sent.
#[derive(Debug)]
pub struct GeneratedClip {
    pub bytes: Vec<u8>,
    /// Whether the overlay used the built-in font
    pub font_fallback: bool,
    /// Number of wrapped quote lines
    pub line_count: usize,
}

/// Shared, read-only pipeline resources.
#[derive(Debug)]
pub struct QuotePipeline {
    photos: PhotoClient,
    speech: SpeechClient,
    renderer: OverlayRenderer,
    runner: FfmpegRunner,
    encoding: EncodingConfig,
    scratch_root: PathBuf,
}

impl QuotePipeline {
    /// Build clients and load fonts from `config`.
    pub fn new(config: &ApiConfig) -> UpstreamResult<Self> {
        let photos = PhotoClient::new(config.photos.clone())?;
        let speech = SpeechClient::new(config.speech.clone())?;
        let renderer = OverlayRenderer::from_paths(&config.fonts);
        let runner = FfmpegRunner::new()
            .with_binary(config.ffmpeg_path.clone())
            .with_timeout(config.encode_timeout.as_secs().max(1));

        Ok(Self {
            photos,
            speech,
            renderer,
            runner,
            encoding: config.encoding.clone(),
            scratch_root: config.scratch_root.clone(),
        })
    }

    /// Whether the overlay fonts fell back to the built-in face.
    pub fn font_fallback(&self) -> bool {
        self.renderer.font_fallback()
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Run the whole pipeline for one request.
    pub async fn run(&self, request: &QuoteRequest, request_id: &str) -> PipelineResult<GeneratedClip> {
        let logger = RequestLogger::new(request_id, "generate");
        let start = Instant::now();

        logger.log_start(&format!(
            "quote_chars={}, author={}",
            request.quote.chars().count(),
            request.author
        ));

        let result = self
            .execute(request, &logger)
            .instrument(logger.create_span())
            .await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(clip) => {
                metrics::record_pipeline_run("success", elapsed);
                metrics::record_output_bytes(clip.bytes.len());
                logger.log_completion(&format!("{} bytes in {:.2}s", clip.bytes.len(), elapsed));
            }
            Err(e) => {
                metrics::record_pipeline_run(e.kind(), elapsed);
                logger.log_error(e.kind(), &e.to_string());
            }
        }

        result
    }

    async fn execute(&self, request: &QuoteRequest, logger: &RequestLogger) -> PipelineResult<GeneratedClip> {
        let workspace = ScratchWorkspace::create(&self.scratch_root).map_err(PipelineError::workspace)?;

        // Background photo
        let stage = Instant::now();
        let photo = self
            .photos
            .fetch_background(&workspace.background_path())
            .await
            .map_err(PipelineError::upstream)?;
        finish_stage(logger, "fetch", stage, &format!("photo {}", photo.id));

        // Overlay
        let stage = Instant::now();
        let outcome = self
            .renderer
            .render(
                workspace.background_path(),
                workspace.still_path(),
                request.quote.clone(),
                request.attribution(),
            )
            .await
            .map_err(PipelineError::render)?;
        if outcome.font_fallback {
            metrics::record_font_fallback();
            logger.log_warning("Overlay rendered with the built-in font");
        }
        finish_stage(logger, "render", stage, &format!("{} lines", outcome.line_count));

        // Narration
        let stage = Instant::now();
        let audio_bytes = self
            .speech
            .synthesize_to_file(&request.narration(), &workspace.audio_path())
            .await
            .map_err(PipelineError::synthesis)?;
        finish_stage(logger, "synthesize", stage, &format!("{} bytes", audio_bytes));

        // Encode
        let stage = Instant::now();
        encode_still_loop(
            &self.runner,
            workspace.still_path(),
            workspace.audio_path(),
            workspace.output_path(),
            &self.encoding,
        )
        .await
        .map_err(PipelineError::encoding)?;
        metrics::record_ffmpeg_duration(stage.elapsed().as_secs_f64());
        finish_stage(logger, "encode", stage, "still loop encoded");

        let bytes = workspace.read_output().await.map_err(PipelineError::output)?;
        workspace.close();

        Ok(GeneratedClip {
            bytes,
            font_fallback: outcome.font_fallback,
            line_count: outcome.line_count,
        })
    }
}

fn finish_stage(logger: &RequestLogger, stage: &str, started: Instant, message: &str) {
    let elapsed = started.elapsed();
    metrics::record_stage_duration(stage, elapsed.as_secs_f64());
    logger.log_stage(stage, elapsed.as_millis(), message);
}
