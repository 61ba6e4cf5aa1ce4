//! Glyph descriptors and cache keys.

use crate::bbox::BoundingBox;

/// Two-component vector, as consumed by the GPU pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Vec2<T> {
    #[must_use]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Where a glyph lives in the atlas and how to draw it.
///
/// `texture_position`/`size` are in texture pixels; the `_clip_space`
/// variants are the same values divided by the texture dimensions. `offset`
/// moves the trimmed bitmap back to the cell's draw origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RasterizedGlyph {
    pub offset: Vec2<i32>,
    pub texture_position: Vec2<u32>,
    pub texture_position_clip_space: Vec2<f32>,
    pub size: Vec2<u32>,
    pub size_clip_space: Vec2<f32>,
}

impl RasterizedGlyph {
    /// Invisible or empty glyph. Cached like any other, never packed.
    pub const NULL: Self = Self {
        offset: Vec2::new(0, 0),
        texture_position: Vec2::new(0, 0),
        texture_position_clip_space: Vec2::new(0.0, 0.0),
        size: Vec2::new(0, 0),
        size_clip_space: Vec2::new(0.0, 0.0),
    };

    /// Descriptor for a glyph trimmed to `bbox` on a scratch surface with
    /// `padding` pixels around the cell. Texture position is filled in when
    /// the glyph is placed.
    #[must_use]
    pub fn from_bounding_box(bbox: BoundingBox, padding: u32, texture: (u32, u32)) -> Self {
        let size = Vec2::new(bbox.width(), bbox.height());
        Self {
            offset: Vec2::new(
                padding as i32 - bbox.left as i32,
                padding as i32 - bbox.top as i32,
            ),
            texture_position: Vec2::default(),
            texture_position_clip_space: Vec2::default(),
            size,
            size_clip_space: Vec2::new(
                size.x as f32 / texture.0 as f32,
                size.y as f32 / texture.1 as f32,
            ),
        }
    }

    #[must_use]
    pub fn with_texture_position(mut self, x: u32, y: u32, texture: (u32, u32)) -> Self {
        self.texture_position = Vec2::new(x, y);
        self.texture_position_clip_space =
            Vec2::new(x as f32 / texture.0 as f32, y as f32 / texture.1 as f32);
        self
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }
}

/// What is drawn: a single code point or a combining cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlyphContent {
    Code(u32),
    Cluster(String),
}

/// Cache key: content plus the raw attribute words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub content: GlyphContent,
    pub bg: u32,
    pub fg: u32,
}

impl GlyphKey {
    #[must_use]
    pub fn code(code: u32, bg: u32, fg: u32) -> Self {
        Self {
            content: GlyphContent::Code(code),
            bg,
            fg,
        }
    }

    #[must_use]
    pub fn cluster(chars: impl Into<String>, bg: u32, fg: u32) -> Self {
        Self {
            content: GlyphContent::Cluster(chars.into()),
            bg,
            fg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_glyph_is_all_zero() {
        assert_eq!(RasterizedGlyph::NULL, RasterizedGlyph::default());
        assert!(RasterizedGlyph::NULL.is_null());
    }

    #[test]
    fn descriptor_from_bounding_box() {
        let bbox = BoundingBox {
            left: 3,
            top: 5,
            right: 10,
            bottom: 20,
        };
        let glyph = RasterizedGlyph::from_bounding_box(bbox, 2, (1024, 512));
        assert_eq!(glyph.size, Vec2::new(8, 16));
        assert_eq!(glyph.offset, Vec2::new(-1, -3));
        assert_eq!(glyph.size_clip_space, Vec2::new(8.0 / 1024.0, 16.0 / 512.0));
        assert!(!glyph.is_null());
    }

    #[test]
    fn texture_position_sets_clip_space() {
        let glyph = RasterizedGlyph::NULL.with_texture_position(512, 256, (1024, 1024));
        assert_eq!(glyph.texture_position, Vec2::new(512, 256));
        assert_eq!(glyph.texture_position_clip_space, Vec2::new(0.5, 0.25));
    }

    #[test]
    fn keys_compare_on_all_parts() {
        assert_eq!(GlyphKey::code(65, 0, 0), GlyphKey::code(65, 0, 0));
        assert_ne!(GlyphKey::code(65, 0, 0), GlyphKey::code(65, 1, 0));
        assert_ne!(GlyphKey::code(65, 0, 0), GlyphKey::code(65, 0, 1));
        assert_ne!(GlyphKey::code(65, 0, 0), GlyphKey::cluster("A", 0, 0));
        assert_eq!(GlyphKey::cluster("e\u{301}", 2, 3), GlyphKey::cluster("e\u{301}", 2, 3));
    }
}
