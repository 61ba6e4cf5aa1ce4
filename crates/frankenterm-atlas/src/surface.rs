//! Scratch drawing surface and the glyph renderer seam.
//!
//! A [`GlyphRenderer`] only produces coverage. Color, opacity and compositing
//! happen here on an RGBA8 [`Canvas`] owned by the rasterizer, so pixels that
//! receive no coverage keep the exact background fill.

use crate::color::Rgba;
use crate::config::FontWeight;

/// Upright or italic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Font selection for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Size in device pixels.
    pub size_px: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontSpec {
    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.weight.is_bold()
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.style == FontStyle::Italic
    }
}

/// 8-bit coverage for a run of text.
///
/// `left`/`top` place the mask's top-left corner relative to the pen origin.
/// The pen origin sits on the left edge of the first glyph, vertically on the
/// middle line of the em box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    /// Row-major, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(width: u32, height: u32, left: i32, top: i32) -> Self {
        Self {
            width,
            height,
            left,
            top,
            coverage: vec![0; (width as usize) * (height as usize)],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coverage.iter().all(|&c| c == 0)
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Saturating add, ignoring out-of-bounds writes.
    pub fn add(&mut self, x: i32, y: i32, alpha: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.coverage[idx] = self.coverage[idx].saturating_add(alpha);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, alpha: u8) {
        for row in y..y.saturating_add(h as i32) {
            for col in x..x.saturating_add(w as i32) {
                self.add(col, row, alpha);
            }
        }
    }

    /// Synthetic bold: each pixel takes the max of itself and its left
    /// neighbour, growing the mask by one column.
    #[must_use]
    pub fn emboldened(&self) -> Self {
        let mut out = Self::new(self.width + 1, self.height, self.left, self.top);
        for y in 0..self.height {
            for x in 0..out.width {
                let left = if x > 0 { self.get(x - 1, y) } else { 0 };
                let idx = (y as usize) * (out.width as usize) + (x as usize);
                out.coverage[idx] = self.get(x, y).max(left);
            }
        }
        out
    }

    /// Synthetic italic: shift each row right by `slant` pixels per row of
    /// height above the bottom edge.
    #[must_use]
    pub fn sheared(&self, slant: f32) -> Self {
        if self.height == 0 || !(slant > 0.0) {
            return self.clone();
        }
        let shift_for = |y: u32| ((self.height - 1 - y) as f32 * slant).round() as u32;
        let mut out = Self::new(self.width + shift_for(0), self.height, self.left, self.top);
        for y in 0..self.height {
            let shift = shift_for(y);
            for x in 0..self.width {
                let idx = (y as usize) * (out.width as usize) + (x + shift) as usize;
                out.coverage[idx] = self.get(x, y);
            }
        }
        out
    }
}

/// Produces coverage masks for text.
///
/// `text` is a single code point or a combining-character cluster. Renderers
/// may keep internal caches, hence `&mut self`.
pub trait GlyphRenderer {
    fn rasterize(&mut self, text: &str, font: &FontSpec) -> GlyphMask;
}

impl<R: GlyphRenderer + ?Sized> GlyphRenderer for Box<R> {
    fn rasterize(&mut self, text: &str, font: &FontSpec) -> GlyphMask {
        (**self).rasterize(text, font)
    }
}

// ---------------------------------------------------------------------------
// RGBA8 canvas (straight alpha)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Overwrite every pixel (copy mode, no blending).
    pub fn fill(&mut self, color: Rgba) {
        let px = [color.r(), color.g(), color.b(), color.a()];
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Source-over composite `color` through `mask`, with the mask's pen
    /// origin at `(origin_x, origin_y)`. Pixels with zero coverage are left
    /// untouched.
    pub fn composite_mask(
        &mut self,
        mask: &GlyphMask,
        origin_x: i32,
        origin_y: i32,
        color: Rgba,
        opacity: f32,
    ) {
        let base_alpha = f32::from(color.a()) / 255.0 * opacity.clamp(0.0, 1.0);
        if base_alpha <= 0.0 {
            return;
        }
        let src = [
            f32::from(color.r()),
            f32::from(color.g()),
            f32::from(color.b()),
        ];

        for my in 0..mask.height {
            let y = origin_y + mask.top + my as i32;
            if y < 0 || y as u32 >= self.height {
                continue;
            }
            for mx in 0..mask.width {
                let x = origin_x + mask.left + mx as i32;
                if x < 0 || x as u32 >= self.width {
                    continue;
                }
                let cov = mask.get(mx, my);
                if cov == 0 {
                    continue;
                }
                let sa = f32::from(cov) / 255.0 * base_alpha;
                let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
                let da = f32::from(self.pixels[i + 3]) / 255.0;
                let out_a = sa + da * (1.0 - sa);
                if out_a <= 0.0 {
                    continue;
                }
                for c in 0..3 {
                    let dst = f32::from(self.pixels[i + c]);
                    let v = (src[c] * sa + dst * da * (1.0 - sa)) / out_a;
                    self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
                }
                self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Make every pixel whose RGB equals `color`'s RGB fully transparent.
    ///
    /// Returns `true` if nothing visible remains.
    pub fn clear_color(&mut self, color: Rgba) -> bool {
        let (r, g, b) = (color.r(), color.g(), color.b());
        let mut empty = true;
        for px in self.pixels.chunks_exact_mut(4) {
            if px[0] == r && px[1] == g && px[2] == b {
                px[3] = 0;
            } else if px[3] != 0 {
                empty = false;
            }
        }
        empty
    }
}
