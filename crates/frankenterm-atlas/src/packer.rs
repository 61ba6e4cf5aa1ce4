//! Shelf packer and the RGBA8 atlas texture.
//!
//! Placement is O(1): glyphs go left to right along the current shelf and a
//! new shelf starts when the next glyph would cross the right edge. Space in
//! a shelf is never reclaimed; the whole texture is reset instead once the
//! cursor passes the capacity line.

use tracing::warn;

/// Rect within the atlas (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl AtlasRect {
    #[must_use]
    pub const fn area_bytes(self) -> usize {
        (self.w as usize) * (self.h as usize) * 4
    }

    /// `true` if the rects share at least one pixel.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Current shelf state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackingCursor {
    pub row_x: u32,
    pub row_y: u32,
    pub row_height: u32,
}

impl PackingCursor {
    #[must_use]
    pub const fn is_origin(&self) -> bool {
        self.row_x == 0 && self.row_y == 0
    }
}

#[derive(Debug, Clone)]
pub struct ShelfPacker {
    width: u32,
    cursor: PackingCursor,
}

impl ShelfPacker {
    #[must_use]
    pub fn new(width: u32) -> Self {
        Self {
            width,
            cursor: PackingCursor::default(),
        }
    }

    #[must_use]
    pub fn cursor(&self) -> PackingCursor {
        self.cursor
    }

    /// Reserve a `w x h` slot and return its top-left corner.
    pub fn place(&mut self, w: u32, h: u32) -> (u32, u32) {
        if self.cursor.row_x + w > self.width {
            self.cursor.row_x = 0;
            self.cursor.row_y += self.cursor.row_height;
            self.cursor.row_height = 0;
        }
        let at = (self.cursor.row_x, self.cursor.row_y);
        self.cursor.row_height = self.cursor.row_height.max(h);
        self.cursor.row_x += w;
        at
    }

    /// The cursor has moved past `capacity` rows.
    #[must_use]
    pub fn is_over(&self, capacity: u32) -> bool {
        self.cursor.row_y > capacity
    }

    pub fn reset(&mut self) {
        self.cursor = PackingCursor::default();
    }
}

/// CPU-side RGBA8 backing store for the atlas.
#[derive(Debug, Clone)]
pub struct AtlasTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    dirty: Vec<AtlasRect>,
}

impl AtlasTexture {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
            dirty: Vec::new(),
        }
    }

    #[must_use]
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take the list of rects written since the last call.
    pub fn take_dirty(&mut self) -> Vec<AtlasRect> {
        std::mem::take(&mut self.dirty)
    }

    /// Zero every pixel and mark the whole texture dirty.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.dirty.clear();
        self.dirty.push(AtlasRect {
            x: 0,
            y: 0,
            w: self.width,
            h: self.height,
        });
    }

    /// Copy a tightly packed `src_w x src_h` RGBA8 image to `(x, y)`.
    ///
    /// Anything past the texture edge is dropped. Returns the rect actually
    /// written, or `None` if nothing landed inside the texture.
    pub fn write(&mut self, x: u32, y: u32, src_w: u32, src_h: u32, src: &[u8]) -> Option<AtlasRect> {
        debug_assert_eq!(src.len(), (src_w as usize) * (src_h as usize) * 4);
        if x >= self.width || y >= self.height || src_w == 0 || src_h == 0 {
            if src_w > 0 && src_h > 0 {
                warn!(x, y, w = src_w, h = src_h, "glyph placed outside the atlas texture");
            }
            return None;
        }

        let w = src_w.min(self.width - x);
        let h = src_h.min(self.height - y);
        if w < src_w || h < src_h {
            warn!(
                x,
                y,
                w = src_w,
                h = src_h,
                "glyph spills past the atlas edge; clipping"
            );
        }

        let atlas_row = self.width as usize * 4;
        let src_row = src_w as usize * 4;
        let copy = w as usize * 4;
        for row in 0..h as usize {
            let dst = (y as usize + row) * atlas_row + x as usize * 4;
            let from = row * src_row;
            self.pixels[dst..dst + copy].copy_from_slice(&src[from..from + copy]);
        }

        let rect = AtlasRect { x, y, w, h };
        self.dirty.push(rect);
        Some(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, v: u8) -> Vec<u8> {
        vec![v; (w * h * 4) as usize]
    }

    #[test]
    fn places_left_to_right() {
        let mut packer = ShelfPacker::new(32);
        assert_eq!(packer.place(10, 4), (0, 0));
        assert_eq!(packer.place(10, 6), (10, 0));
        assert_eq!(
            packer.cursor(),
            PackingCursor {
                row_x: 20,
                row_y: 0,
                row_height: 6
            }
        );
    }

    #[test]
    fn shelf_row_exact_width_fit_no_break() {
        let mut packer = ShelfPacker::new(20);
        packer.place(10, 3);
        assert_eq!(packer.place(10, 3), (10, 0));
    }

    #[test]
    fn shelf_row_break_at_one_pixel_over() {
        let mut packer = ShelfPacker::new(20);
        packer.place(10, 3);
        assert_eq!(packer.place(11, 5), (0, 3));
        assert_eq!(packer.cursor().row_height, 5);
    }

    #[test]
    fn shelf_height_never_shrinks() {
        let mut packer = ShelfPacker::new(16);
        packer.place(8, 9);
        packer.place(8, 2);
        // The short glyph does not reclaim the shelf's height.
        assert_eq!(packer.place(8, 2), (0, 9));
    }

    #[test]
    fn multiple_shelf_rows_with_varying_heights() {
        let mut packer = ShelfPacker::new(10);
        let placed: Vec<_> = [(6, 3), (6, 7), (4, 2), (6, 1), (10, 4)]
            .into_iter()
            .map(|(w, h)| packer.place(w, h))
            .collect();
        assert_eq!(placed, vec![(0, 0), (0, 3), (6, 3), (0, 10), (0, 11)]);
    }

    #[test]
    fn capacity_check_is_strict() {
        let mut packer = ShelfPacker::new(4);
        packer.place(4, 10);
        packer.place(4, 1);
        assert!(!packer.is_over(10));
        packer.place(4, 1);
        assert!(packer.is_over(10));
        packer.reset();
        assert!(packer.cursor().is_origin());
        assert!(!packer.is_over(0));
    }

    #[test]
    fn write_copies_pixels_and_tracks_dirty_rect() {
        let mut tex = AtlasTexture::new(8, 8);
        let rect = tex.write(2, 3, 2, 2, &solid(2, 2, 7)).expect("write");
        assert_eq!(rect, AtlasRect { x: 2, y: 3, w: 2, h: 2 });
        let px = tex.pixels();
        let at = |x: usize, y: usize| px[(y * 8 + x) * 4];
        assert_eq!(at(2, 3), 7);
        assert_eq!(at(3, 4), 7);
        assert_eq!(at(1, 3), 0);
        assert_eq!(at(4, 3), 0);
        assert_eq!(tex.take_dirty(), vec![rect]);
        assert!(tex.take_dirty().is_empty());
    }

    #[test]
    fn write_clips_at_texture_edge() {
        let mut tex = AtlasTexture::new(4, 4);
        let rect = tex.write(3, 2, 3, 3, &solid(3, 3, 9)).expect("write");
        assert_eq!(rect, AtlasRect { x: 3, y: 2, w: 1, h: 2 });
        assert_eq!(tex.pixels()[(3 * 4 + 3) * 4], 9);
    }

    #[test]
    fn write_outside_texture_is_dropped() {
        let mut tex = AtlasTexture::new(4, 4);
        assert_eq!(tex.write(0, 4, 1, 1, &solid(1, 1, 1)), None);
        assert!(tex.take_dirty().is_empty());
        assert!(tex.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_zeroes_and_marks_everything_dirty() {
        let mut tex = AtlasTexture::new(4, 4);
        tex.write(0, 0, 2, 2, &solid(2, 2, 5));
        tex.clear();
        assert!(tex.pixels().iter().all(|&b| b == 0));
        assert_eq!(tex.take_dirty(), vec![AtlasRect { x: 0, y: 0, w: 4, h: 4 }]);
    }

    #[test]
    fn rect_intersection() {
        let a = AtlasRect { x: 0, y: 0, w: 4, h: 4 };
        assert!(a.intersects(AtlasRect { x: 3, y: 3, w: 2, h: 2 }));
        assert!(!a.intersects(AtlasRect { x: 4, y: 0, w: 2, h: 2 }));
        assert!(!a.intersects(AtlasRect { x: 0, y: 4, w: 2, h: 2 }));
        assert_eq!(a.area_bytes(), 64);
    }

    #[test]
    fn golden_fixture_placements_are_stable() {
        let mut packer = ShelfPacker::new(64);
        let sizes = [(9, 14), (12, 13), (7, 15), (20, 11), (18, 14), (9, 3), (30, 10)];
        let placed: Vec<_> = sizes.iter().map(|&(w, h)| packer.place(w, h)).collect();
        assert_eq!(
            placed,
            vec![(0, 0), (9, 0), (21, 0), (28, 0), (0, 15), (18, 15), (27, 15)]
        );
        assert_eq!(
            packer.cursor(),
            PackingCursor {
                row_x: 57,
                row_y: 15,
                row_height: 14
            }
        );
    }
}
