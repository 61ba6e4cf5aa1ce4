//! Draws one glyph with resolved colors and trims it to its visible pixels.

use crate::attrs::AttributePair;
use crate::bbox::{clip_image_data, find_glyph_bounding_box};
use crate::color::{Rgba, parse_css_color};
use crate::config::{AtlasConfig, DIM_OPACITY, GLYPH_PADDING, TEXTURE_HEIGHT, TEXTURE_WIDTH};
use crate::contrast::ContrastEnforcer;
use crate::error::AtlasError;
use crate::glyph::RasterizedGlyph;
use crate::surface::{Canvas, FontSpec, FontStyle, GlyphRenderer};

/// A drawn glyph, trimmed to its bounding box, not yet placed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedGlyph {
    /// Descriptor with size and offset set; texture position still zero.
    pub glyph: RasterizedGlyph,
    /// RGBA8, `glyph.size.x * glyph.size.y * 4` bytes.
    pub pixels: Vec<u8>,
}

fn css_to_rgba(css: &str) -> Result<Rgba, AtlasError> {
    parse_css_color(css).ok_or_else(|| AtlasError::InvalidColor(css.to_owned()))
}

pub struct GlyphRasterizer<R> {
    config: AtlasConfig,
    renderer: R,
    canvas: Canvas,
    contrast: ContrastEnforcer,
}

impl<R: GlyphRenderer> GlyphRasterizer<R> {
    /// `config` must already be validated.
    pub fn new(config: AtlasConfig, renderer: R) -> Self {
        let (w, h) = config.scratch_size();
        Self {
            config,
            renderer,
            canvas: Canvas::new(w, h),
            contrast: ContrastEnforcer::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    #[must_use]
    pub fn contrast(&self) -> &ContrastEnforcer {
        &self.contrast
    }

    pub fn contrast_mut(&mut self) -> &mut ContrastEnforcer {
        &mut self.contrast
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Scratch surface as left by the last draw.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Draw `text` with `attrs`. `Ok(None)` means the glyph is invisible or
    /// left no visible pixels.
    pub fn rasterize(
        &mut self,
        text: &str,
        attrs: AttributePair,
    ) -> Result<Option<TrimmedGlyph>, AtlasError> {
        if attrs.is_invisible() {
            return Ok(None);
        }

        let bold = attrs.is_bold();
        let inverse = attrs.is_inverse();
        let dim = attrs.is_dim();
        let italic = attrs.is_italic();

        let (mut fg_mode, mut fg_value) = (attrs.fg_color_mode(), attrs.fg_color());
        let (mut bg_mode, mut bg_value) = (attrs.bg_color_mode(), attrs.bg_color());
        if inverse {
            std::mem::swap(&mut fg_mode, &mut bg_mode);
            std::mem::swap(&mut fg_value, &mut bg_value);
        }

        let background = self.config.resolve_background(bg_mode, bg_value, inverse)?;
        self.canvas.fill(css_to_rgba(&background.css)?);

        let font = FontSpec {
            size_px: self.config.scaled_font_size(),
            weight: if bold {
                self.config.font_weight_bold
            } else {
                self.config.font_weight
            },
            style: if italic {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            },
        };

        let config = &self.config;
        let adjusted = self.contrast.minimum_contrast_css(
            attrs.bg,
            attrs.fg,
            f64::from(config.minimum_contrast_ratio),
            || {
                Ok((
                    config.background_rgba(bg_mode, bg_value, inverse)?,
                    config.foreground_rgba(fg_mode, fg_value, inverse, bold)?,
                ))
            },
        )?;
        let foreground_css = match adjusted {
            Some(css) => css,
            None => config.foreground_css(fg_mode, fg_value, inverse, bold)?,
        };
        let foreground = css_to_rgba(&foreground_css)?;

        let mask = self.renderer.rasterize(text, &font);
        let pad = i32::from(GLYPH_PADDING);
        // Integer pixel grid: an odd cell height puts the middle line on the
        // upper of the two centre rows.
        let baseline_y = pad + i32::from(self.config.scaled_char_height) / 2;
        let opacity = if dim { DIM_OPACITY } else { 1.0 };
        self.canvas
            .composite_mask(&mask, pad, baseline_y, foreground, opacity);

        if self.canvas.clear_color(background.rgba) {
            return Ok(None);
        }

        let (w, h) = (self.canvas.width(), self.canvas.height());
        let Some(bbox) = find_glyph_bounding_box(self.canvas.pixels(), w, h) else {
            return Ok(None);
        };
        Ok(Some(TrimmedGlyph {
            glyph: RasterizedGlyph::from_bounding_box(
                bbox,
                u32::from(GLYPH_PADDING),
                (TEXTURE_WIDTH, TEXTURE_HEIGHT),
            ),
            pixels: clip_image_data(self.canvas.pixels(), w, bbox),
        }))
    }
}
