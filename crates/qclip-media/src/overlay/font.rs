//! Typefaces for the quote overlay.
//!
//! TrueType faces are rasterized with `ab_glyph`. When a configured font
//! cannot be loaded the renderer falls back to the `font8x8` bitmap face,
//! scaled up to roughly the requested size.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use qclip_models::encoding::{
    ATTRIBUTION_FONT_SIZE, DEFAULT_AUTHOR_FONT, DEFAULT_QUOTE_FONT, QUOTE_FONT_SIZE,
};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Side length of a `font8x8` glyph in bits.
const BITMAP_GLYPH_SIZE: u32 = 8;

/// A face at a fixed pixel size that can measure and draw one line of text.
#[derive(Clone)]
pub enum Typeface {
    TrueType { font: FontArc, scale: PxScale },
    /// Built-in 8x8 bitmap face; each glyph bit is drawn as a `cell` square.
    Builtin { cell: u32 },
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::TrueType { scale, .. } => f
                .debug_struct("TrueType")
                .field("px", &scale.y)
                .finish(),
            Typeface::Builtin { cell } => f.debug_struct("Builtin").field("cell", cell).finish(),
        }
    }
}

impl Typeface {
    pub fn truetype(font: FontArc, px: f32) -> Self {
        Typeface::TrueType {
            font,
            scale: PxScale::from(px),
        }
    }

    /// Built-in face sized at about half the requested pixel height.
    pub fn builtin(px: f32) -> Self {
        let cell = (px / 16.0).round().max(1.0) as u32;
        Typeface::Builtin { cell }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Builtin { .. })
    }

    /// Horizontal advance of `text` in pixels.
    pub fn measure(&self, text: &str) -> u32 {
        match self {
            Typeface::TrueType { font, scale } => {
                let scaled = font.as_scaled(*scale);
                let mut width = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(prev) = prev {
                        width += scaled.kern(prev, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width.max(0.0).ceil() as u32
            }
            Typeface::Builtin { cell } => {
                text.chars().count() as u32 * BITMAP_GLYPH_SIZE * cell
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    ///
    /// Pixels outside the canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        match self {
            Typeface::TrueType { font, scale } => {
                let scaled = font.as_scaled(*scale);
                let baseline = y as f32 + scaled.ascent();
                let mut caret = x as f32;
                let mut prev: Option<GlyphId> = None;

                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(prev) = prev {
                        caret += scaled.kern(prev, id);
                    }
                    let glyph = id.with_scale_and_position(*scale, point(caret, baseline));
                    caret += scaled.h_advance(id);
                    prev = Some(id);

                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, coverage| {
                            blend(
                                canvas,
                                bounds.min.x as i32 + gx as i32,
                                bounds.min.y as i32 + gy as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                }
            }
            Typeface::Builtin { cell } => {
                let cell = *cell as i32;
                let advance = BITMAP_GLYPH_SIZE as i32 * cell;

                for (i, ch) in text.chars().enumerate() {
                    let bitmap = BASIC_FONTS
                        .get(ch)
                        .or_else(|| BASIC_FONTS.get('?'))
                        .unwrap_or([0; 8]);
                    let origin_x = x + i as i32 * advance;

                    for (row, bits) in bitmap.iter().enumerate() {
                        for col in 0..BITMAP_GLYPH_SIZE as i32 {
                            if bits & (1 << col) != 0 {
                                fill_cell(
                                    canvas,
                                    origin_x + col * cell,
                                    y + row as i32 * cell,
                                    cell,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

fn blend(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().zip(color.0) {
        *channel = (*channel as f32 * (1.0 - alpha) + target as f32 * alpha).round() as u8;
    }
}

fn fill_cell(canvas: &mut RgbImage, x: i32, y: i32, size: i32, color: Rgb<u8>) {
    for dy in 0..size {
        for dx in 0..size {
            blend(canvas, x + dx, y + dy, color, 1.0);
        }
    }
}

/// Font files used for the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontPaths {
    pub quote: PathBuf,
    pub attribution: PathBuf,
}

impl Default for FontPaths {
    fn default() -> Self {
        Self {
            quote: PathBuf::from(DEFAULT_QUOTE_FONT),
            attribution: PathBuf::from(DEFAULT_AUTHOR_FONT),
        }
    }
}

/// The quote and attribution faces, plus whether they are the fallback.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub quote: Typeface,
    pub attribution: Typeface,
    pub fallback: bool,
}

impl FontSet {
    /// Load both fonts, falling back to the built-in face if either fails.
    pub fn load(paths: &FontPaths) -> Self {
        let quote = load_font(&paths.quote);
        let attribution = load_font(&paths.attribution);

        match (quote, attribution) {
            (Ok(quote), Ok(attribution)) => {
                debug!(
                    quote = %paths.quote.display(),
                    attribution = %paths.attribution.display(),
                    "Loaded overlay fonts"
                );
                Self {
                    quote: Typeface::truetype(quote, QUOTE_FONT_SIZE),
                    attribution: Typeface::truetype(attribution, ATTRIBUTION_FONT_SIZE),
                    fallback: false,
                }
            }
            (quote, attribution) => {
                let reason = quote
                    .err()
                    .or(attribution.err())
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                warn!(font_fallback = true, reason = %reason, "Using built-in bitmap font");
                Self::builtin()
            }
        }
    }

    /// The built-in bitmap faces.
    pub fn builtin() -> Self {
        Self {
            quote: Typeface::builtin(QUOTE_FONT_SIZE),
            attribution: Typeface::builtin(ATTRIBUTION_FONT_SIZE),
            fallback: true,
        }
    }
}

fn load_font(path: &Path) -> MediaResult<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| MediaError::InvalidMedia(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_measure_is_per_char() {
        let face = Typeface::builtin(QUOTE_FONT_SIZE);
        assert_eq!(face.measure(""), 0);
        assert_eq!(face.measure("abc"), 3 * 8 * 4);
        assert_eq!(face.measure("é"), face.measure("e"));
    }

    #[test]
    fn test_builtin_draw_is_clipped() {
        let mut canvas = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        Typeface::builtin(16.0).draw(&mut canvas, -4, 12, Rgb([255, 255, 255]), "XX");
        assert!(canvas.pixels().any(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_missing_font_falls_back() {
        let fonts = FontSet::load(&FontPaths {
            quote: PathBuf::from("/nonexistent/quote.ttf"),
            attribution: PathBuf::from("/nonexistent/author.ttf"),
        });
        assert!(fonts.fallback);
        assert!(fonts.quote.is_builtin());
        assert!(fonts.attribution.is_builtin());
    }

    #[test]
    fn test_invalid_font_bytes_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let fonts = FontSet::load(&FontPaths {
            quote: bogus.clone(),
            attribution: bogus,
        });
        assert!(fonts.fallback);
    }

    #[test]
    fn test_system_font_measures_when_present() {
        let paths = FontPaths::default();
        if !paths.quote.exists() || !paths.attribution.exists() {
            return;
        }
        let fonts = FontSet::load(&paths);
        assert!(!fonts.fallback);
        let short = fonts.quote.measure("Stay");
        let long = fonts.quote.measure("Stay hungry");
        assert!(short > 0 && long > short);
    }
}
