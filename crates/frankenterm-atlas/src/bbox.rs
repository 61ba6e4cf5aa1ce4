//! Tight bounding boxes over RGBA8 buffers and sub-rectangle copies.

/// Inclusive pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

#[inline]
fn alpha_at(pixels: &[u8], width: u32, x: u32, y: u32) -> u8 {
    pixels[((y as usize) * (width as usize) + (x as usize)) * 4 + 3]
}

/// Smallest box containing every pixel with non-zero alpha, or `None` if the
/// buffer is fully transparent.
///
/// Four independent scans, one from each edge inward; each stops at the first
/// row or column holding a visible pixel.
#[must_use]
pub fn find_glyph_bounding_box(pixels: &[u8], width: u32, height: u32) -> Option<BoundingBox> {
    debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
    let row_hit = |y: u32| (0..width).any(|x| alpha_at(pixels, width, x, y) != 0);
    let col_hit = |x: u32| (0..height).any(|y| alpha_at(pixels, width, x, y) != 0);

    let top = (0..height).find(|&y| row_hit(y))?;
    let bottom = (0..height).rev().find(|&y| row_hit(y))?;
    let left = (0..width).find(|&x| col_hit(x))?;
    let right = (0..width).rev().find(|&x| col_hit(x))?;

    Some(BoundingBox {
        left,
        top,
        right,
        bottom,
    })
}

/// Copy the `bbox` region of an RGBA8 buffer `width` pixels wide into a new
/// tightly packed buffer.
#[must_use]
pub fn clip_image_data(pixels: &[u8], width: u32, bbox: BoundingBox) -> Vec<u8> {
    let row_bytes = bbox.width() as usize * 4;
    let mut out = Vec::with_capacity(row_bytes * bbox.height() as usize);
    for y in bbox.top..=bbox.bottom {
        let start = ((y as usize) * (width as usize) + bbox.left as usize) * 4;
        out.extend_from_slice(&pixels[start..start + row_bytes]);
    }
    out
}
