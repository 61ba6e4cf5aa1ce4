//! TrueType/OpenType glyph rendering via `fontdue`.

use fontdue::{Font, FontSettings, Metrics};
use tracing::debug;

use crate::error::AtlasError;
use crate::surface::{FontSpec, GlyphMask, GlyphRenderer};

/// Horizontal shift per pixel of height for synthetic italics (~11 degrees).
const SYNTHETIC_SLANT: f32 = 0.2;

fn load_font(bytes: &[u8]) -> Result<Font, AtlasError> {
    Font::from_bytes(bytes, FontSettings::default()).map_err(|e| AtlasError::Font(e.to_owned()))
}

/// Renders text from font bytes.
///
/// Bold and italic faces are optional; when one is missing the regular face
/// is emboldened or sheared instead.
pub struct FontdueRenderer {
    regular: Font,
    bold: Option<Font>,
    italic: Option<Font>,
}

impl std::fmt::Debug for FontdueRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueRenderer")
            .field("regular", &self.regular.name())
            .field("bold", &self.bold.as_ref().map(Font::name))
            .field("italic", &self.italic.as_ref().map(Font::name))
            .finish()
    }
}

impl FontdueRenderer {
    pub fn from_bytes(regular: &[u8]) -> Result<Self, AtlasError> {
        let regular = load_font(regular)?;
        debug!(font = ?regular.name(), glyphs = regular.glyph_count(), "loaded regular face");
        Ok(Self {
            regular,
            bold: None,
            italic: None,
        })
    }

    pub fn with_bold(mut self, bytes: &[u8]) -> Result<Self, AtlasError> {
        self.bold = Some(load_font(bytes)?);
        Ok(self)
    }

    pub fn with_italic(mut self, bytes: &[u8]) -> Result<Self, AtlasError> {
        self.italic = Some(load_font(bytes)?);
        Ok(self)
    }

    /// Face for `font`, plus whether bold/italic must be synthesized.
    fn face(&self, font: &FontSpec) -> (&Font, bool, bool) {
        match (font.is_bold(), font.is_italic()) {
            (true, true) => match (&self.bold, &self.italic) {
                (Some(bold), _) => (bold, false, true),
                (None, Some(italic)) => (italic, true, false),
                (None, None) => (&self.regular, true, true),
            },
            (true, false) => match &self.bold {
                Some(bold) => (bold, false, false),
                None => (&self.regular, true, false),
            },
            (false, true) => match &self.italic {
                Some(italic) => (italic, false, false),
                None => (&self.regular, false, true),
            },
            (false, false) => (&self.regular, false, false),
        }
    }
}

struct Placed {
    metrics: Metrics,
    bitmap: Vec<u8>,
    pen_x: i32,
}

impl GlyphRenderer for FontdueRenderer {
    fn rasterize(&mut self, text: &str, font: &FontSpec) -> GlyphMask {
        let (face, synth_bold, synth_italic) = self.face(font);
        let px = font.size_px;

        // Baseline position below the middle of the em box (y down).
        let baseline = face
            .horizontal_line_metrics(px)
            .map_or(px * 0.3, |lm| (lm.ascent + lm.descent) / 2.0);

        let mut pen = 0.0f32;
        let mut placed = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let (metrics, bitmap) = face.rasterize(ch, px);
            placed.push(Placed {
                metrics,
                bitmap,
                pen_x: pen.round() as i32,
            });
            pen += metrics.advance_width;
        }

        let visible = placed
            .iter()
            .filter(|p| p.metrics.width > 0 && p.metrics.height > 0);
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for p in visible.clone() {
            let x0 = p.pen_x + p.metrics.xmin;
            let y0 = baseline.round() as i32 - (p.metrics.ymin + p.metrics.height as i32);
            let x1 = x0 + p.metrics.width as i32;
            let y1 = y0 + p.metrics.height as i32;
            bounds = Some(match bounds {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            });
        }
        let Some((left, top, right, bottom)) = bounds else {
            return GlyphMask::empty();
        };

        let mut mask = GlyphMask::new((right - left) as u32, (bottom - top) as u32, left, top);
        for p in visible {
            let x0 = p.pen_x + p.metrics.xmin - left;
            let y0 = baseline.round() as i32 - (p.metrics.ymin + p.metrics.height as i32) - top;
            for (row, line) in p.bitmap.chunks_exact(p.metrics.width).enumerate() {
                for (col, &alpha) in line.iter().enumerate() {
                    if alpha != 0 {
                        mask.add(x0 + col as i32, y0 + row as i32, alpha);
                    }
                }
            }
        }

        if synth_bold {
            mask = mask.emboldened();
        }
        if synth_italic {
            mask = mask.sheared(SYNTHETIC_SLANT);
        }
        mask
    }
}
