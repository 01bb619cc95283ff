//! Quote overlay rendering.
//!
//! Stretches the background to the output canvas, wraps the quote and draws
//! it centered with a drop shadow, then the attribution underneath.

mod font;
mod wrap;

pub use font::{FontPaths, FontSet, Typeface};
pub use wrap::wrap_text;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use qclip_models::encoding::{
    ATTRIBUTION_GAP, ATTRIBUTION_RESERVE, ATTRIBUTION_SHADOW_OFFSET, CANVAS_HEIGHT, CANVAS_WIDTH,
    LINE_HEIGHT, MAX_LINE_WIDTH, QUOTE_SHADOW_OFFSET, STILL_JPEG_QUALITY,
};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const SHADOW_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Result of composing one still.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Where the JPEG was written
    pub path: PathBuf,
    /// Number of wrapped quote lines
    pub line_count: usize,
    /// Whether the built-in bitmap face was used
    pub font_fallback: bool,
}

/// Draws quote overlays onto background photos.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    fonts: Arc<FontSet>,
}

impl OverlayRenderer {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts: Arc::new(fonts),
        }
    }

    /// Load fonts from `paths` and build a renderer.
    pub fn from_paths(paths: &FontPaths) -> Self {
        Self::new(FontSet::load(paths))
    }

    pub fn font_fallback(&self) -> bool {
        self.fonts.fallback
    }

    /// Compose the overlay onto `background`, returning the canvas and line count.
    pub fn compose(&self, background: &DynamicImage, quote: &str, attribution: &str) -> (RgbImage, usize) {
        let mut canvas = background
            .resize_exact(CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Lanczos3)
            .to_rgb8();

        let lines = wrap_text(&self.fonts.quote, quote, MAX_LINE_WIDTH);
        let line_height = LINE_HEIGHT as i32;
        let block_height = lines.len() as i32 * line_height + ATTRIBUTION_RESERVE as i32;
        let mut y = (CANVAS_HEIGHT as i32 - block_height) / 2;

        for line in &lines {
            let x = centered_x(&self.fonts.quote, line);
            draw_shadowed(&mut canvas, &self.fonts.quote, x, y, QUOTE_SHADOW_OFFSET, line);
            y += line_height;
        }

        let x = centered_x(&self.fonts.attribution, attribution);
        draw_shadowed(
            &mut canvas,
            &self.fonts.attribution,
            x,
            y + ATTRIBUTION_GAP,
            ATTRIBUTION_SHADOW_OFFSET,
            attribution,
        );

        (canvas, lines.len())
    }

    /// Decode `background`, compose the overlay and save it as JPEG to `output`.
    pub fn render_file(
        &self,
        background: &Path,
        output: &Path,
        quote: &str,
        attribution: &str,
    ) -> MediaResult<RenderOutcome> {
        let image = ImageReader::open(background)?.with_guessed_format()?.decode()?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Decoded background image"
        );

        let (canvas, line_count) = self.compose(&image, quote, attribution);

        let mut writer = BufWriter::new(File::create(output)?);
        JpegEncoder::new_with_quality(&mut writer, STILL_JPEG_QUALITY).encode_image(&canvas)?;
        writer.flush()?;

        Ok(RenderOutcome {
            path: output.to_path_buf(),
            line_count,
            font_fallback: self.fonts.fallback,
        })
    }

    /// Run [`render_file`](Self::render_file) on the blocking thread pool.
    pub async fn render(
        &self,
        background: PathBuf,
        output: PathBuf,
        quote: String,
        attribution: String,
    ) -> MediaResult<RenderOutcome> {
        let renderer = self.clone();
        tokio::task::spawn_blocking(move || {
            renderer.render_file(&background, &output, &quote, &attribution)
        })
        .await
        .map_err(|e| MediaError::internal(format!("Render task failed: {}", e)))?
    }
}

fn centered_x(face: &Typeface, text: &str) -> i32 {
    (CANVAS_WIDTH as i32 - face.measure(text) as i32) / 2
}

fn draw_shadowed(canvas: &mut RgbImage, face: &Typeface, x: i32, y: i32, offset: i32, text: &str) {
    face.draw(canvas, x + offset, y + offset, SHADOW_COLOR, text);
    face.draw(canvas, x, y, TEXT_COLOR, text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_background() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([128, 128, 128])))
    }

    #[test]
    fn test_compose_stretches_and_draws() {
        let renderer = OverlayRenderer::new(FontSet::builtin());
        let (canvas, lines) = renderer.compose(&gray_background(), "Stay hungry, stay foolish.", "- Steve Jobs");

        assert_eq!(canvas.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert_eq!(lines, 1);
        assert!(canvas.pixels().any(|p| p.0 == [255, 255, 255]));
        assert!(canvas.pixels().any(|p| p.0 == [0, 0, 0]));
        // Corners keep the background
        let corner = canvas.get_pixel(0, 0).0;
        assert!(corner != [255, 255, 255] && corner != [0, 0, 0]);
    }

    #[test]
    fn test_text_block_is_vertically_centered() {
        let renderer = OverlayRenderer::new(FontSet::builtin());
        let (canvas, _) = renderer.compose(&gray_background(), "Hi", "- A");

        let rows_with_text: Vec<u32> = (0..CANVAS_HEIGHT)
            .filter(|&y| (0..CANVAS_WIDTH).any(|x| canvas.get_pixel(x, y).0 == [255, 255, 255]))
            .collect();
        let top = *rows_with_text.first().unwrap();
        // One line: block is 190px tall, so it starts at (1080 - 190) / 2
        assert_eq!(top, 445);
    }

    #[test]
    fn test_render_file_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("background.png");
        let output = dir.path().join("quote_image.jpg");
        gray_background().save(&background).unwrap();

        let renderer = OverlayRenderer::new(FontSet::builtin());
        let outcome = renderer
            .render_file(&background, &output, "Hello world", "- Unknown")
            .unwrap();

        assert_eq!(outcome.path, output);
        assert_eq!(outcome.line_count, 1);
        assert!(outcome.font_fallback);

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[test]
    fn test_undecodable_background_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("background.jpg");
        std::fs::write(&background, b"<html>not an image</html>").unwrap();

        let renderer = OverlayRenderer::new(FontSet::builtin());
        let result = renderer.render_file(&background, &dir.path().join("out.jpg"), "q", "- a");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_render_runs_off_the_async_thread() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("background.png");
        gray_background().save(&background).unwrap();

        let renderer = OverlayRenderer::new(FontSet::builtin());
        let outcome = renderer
            .render(
                background,
                dir.path().join("quote_image.jpg"),
                "No quote provided".to_string(),
                "- Unknown".to_string(),
            )
            .await
            .unwrap();
        assert!(outcome.path.exists());
    }
}
