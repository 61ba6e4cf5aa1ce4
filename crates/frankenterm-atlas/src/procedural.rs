//! Font-free glyph renderer.
//!
//! Every visible code point becomes an outlined box with an interior pattern
//! seeded by the code point, so distinct characters produce distinct pixels
//! without shipping a font. Useful as a fallback when no font bytes are
//! available and for deterministic tests.
//!
//! Geometry, for a font size `s` in device pixels:
//! - one column is `round(s * 0.5)` wide, boxes are `round(s * 0.7)` tall
//! - a combining-mark band of `max(box_h / 6, 1)` rows sits above the boxes
//! - wide characters (per `unicode-width`) span two columns
//! - bold doubles the outline stroke, italic shears by a quarter of the box
//!   height

use unicode_width::UnicodeWidthChar;

use crate::surface::{FontSpec, GlyphMask, GlyphRenderer};

const GOLDEN_RATIO_32: u32 = 0x9E37_79B9;

/// Deterministic box renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralRenderer;

impl ProceduralRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    col_w: u32,
    box_h: u32,
    mark_h: u32,
    stroke: u32,
    shear: u32,
}

impl Geometry {
    fn for_font(font: &FontSpec) -> Self {
        let size = if font.size_px.is_finite() {
            font.size_px.max(1.0)
        } else {
            1.0
        };
        let col_w = ((size * 0.5).round() as u32).max(2);
        let box_h = ((size * 0.7).round() as u32).max(3);
        Self {
            col_w,
            box_h,
            mark_h: (box_h / 6).max(1),
            stroke: if font.is_bold() { 2 } else { 1 },
            shear: if font.is_italic() { box_h / 4 } else { 0 },
        }
    }

    /// Horizontal shift for mask row `y`; top rows lean right.
    fn shift(&self, y: u32) -> i32 {
        if self.shear == 0 {
            return 0;
        }
        let total = self.mark_h + self.box_h;
        let from_bottom = total.saturating_sub(y + 1);
        (self.shear * from_bottom / total) as i32
    }
}

impl GlyphRenderer for ProceduralRenderer {
    fn rasterize(&mut self, text: &str, font: &FontSpec) -> GlyphMask {
        let geo = Geometry::for_font(font);

        let columns: u32 = text
            .chars()
            .map(|c| c.width().unwrap_or(0) as u32)
            .sum::<u32>()
            .max(1);
        let width = columns * geo.col_w + geo.shear;
        let height = geo.mark_h + geo.box_h;
        let mut mask = GlyphMask::new(
            width,
            height,
            0,
            -((geo.box_h / 2) as i32) - geo.mark_h as i32,
        );

        let mut col = 0u32;
        let mut prev_col = 0u32;
        let mut prev_span = 1u32;
        for c in text.chars() {
            let span = c.width().unwrap_or(0) as u32;
            if span == 0 {
                draw_mark(&mut mask, &geo, prev_col, prev_span);
                continue;
            }
            if !c.is_whitespace() {
                draw_box(&mut mask, &geo, c as u32, col, span);
            }
            prev_col = col;
            prev_span = span;
            col += span;
        }
        mask
    }
}

fn draw_box(mask: &mut GlyphMask, geo: &Geometry, cp: u32, col: u32, span: u32) {
    let x0 = col * geo.col_w;
    // One column of gap keeps neighbours apart.
    let w = (span * geo.col_w).saturating_sub(1).max(1);
    let y0 = geo.mark_h;
    let h = geo.box_h;
    let seed = cp.wrapping_mul(GOLDEN_RATIO_32) | 1;

    for dy in 0..h {
        let y = y0 + dy;
        let shift = geo.shift(y);
        for dx in 0..w {
            let border =
                dx < geo.stroke || dy < geo.stroke || dx + geo.stroke >= w || dy + geo.stroke >= h;
            let on = if border {
                true
            } else {
                let bit = (dx * 7 + dy * 13) % 32;
                seed & (1 << bit) != 0
            };
            if on {
                mask.add((x0 + dx) as i32 + shift, y as i32, 0xFF);
            }
        }
    }
}

fn draw_mark(mask: &mut GlyphMask, geo: &Geometry, col: u32, span: u32) {
    let x0 = col * geo.col_w;
    let w = (span * geo.col_w).saturating_sub(1).max(1);
    for y in 0..geo.mark_h {
        let shift = geo.shift(y);
        for dx in 0..w {
            mask.add((x0 + dx) as i32 + shift, y as i32, 0xFF);
        }
    }
}
