//! The glyph atlas cache.
//!
//! Lookups are keyed by `(code point or cluster, bg attribute, fg attribute)`.
//! A miss rasterizes the glyph, trims it, packs it onto the current shelf and
//! copies its pixels into the shared texture. Entries are never evicted one
//! by one: once the packing cursor passes the capacity line,
//! [`CharAtlas::begin_frame`] drops everything, clears the texture and
//! re-runs the ASCII warm-up.
//!
//! Call order per render pass:
//!
//! ```text
//! begin_frame() -> reset?   (invalidate texture coordinates held elsewhere)
//! get_glyph / get_glyph_for_cluster ...
//! has_canvas_changed() -> upload texture() or take_dirty_rects()
//! clear_canvas_changed()
//! ```

use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace};

use crate::attrs::{AttributePair, DEFAULT_COLOR};
use crate::config::{AtlasConfig, TEXTURE_HEIGHT, TEXTURE_WIDTH};
use crate::error::AtlasError;
use crate::glyph::{GlyphContent, GlyphKey, RasterizedGlyph};
use crate::packer::{AtlasRect, AtlasTexture, PackingCursor, ShelfPacker};
use crate::rasterizer::GlyphRasterizer;
use crate::surface::GlyphRenderer;

/// Printable ASCII rasterized eagerly with default colors.
pub const WARM_UP_RANGE: std::ops::RangeInclusive<u32> = 33..=126;

/// Row past which the atlas resets: 80% of the texture height.
pub const TEXTURE_CAPACITY: u32 = TEXTURE_HEIGHT * 8 / 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtlasStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses that produced the null glyph.
    pub null_glyphs: u64,
    pub resets: u64,
    pub bytes_uploaded: u64,
}

/// Glyph atlas over a single fixed-size RGBA8 texture.
pub struct CharAtlas<R> {
    rasterizer: GlyphRasterizer<R>,
    texture: AtlasTexture,
    packer: ShelfPacker,
    glyphs: FxHashMap<(u32, u32, u32), RasterizedGlyph>,
    clusters: FxHashMap<String, FxHashMap<(u32, u32), RasterizedGlyph>>,
    did_warm_up: bool,
    canvas_changed: bool,
    stats: AtlasStats,
}

impl<R: GlyphRenderer> CharAtlas<R> {
    /// Build an atlas. The configuration is normalized, then validated.
    pub fn new(config: AtlasConfig, renderer: R) -> Result<Self, AtlasError> {
        let config = config.normalized();
        config.validate()?;
        debug!(
            font_family = %config.font_family,
            font_size = config.font_size,
            dpr = config.device_pixel_ratio,
            cell_w = config.scaled_char_width,
            cell_h = config.scaled_char_height,
            "creating char atlas"
        );
        Ok(Self {
            rasterizer: GlyphRasterizer::new(config, renderer),
            texture: AtlasTexture::new(TEXTURE_WIDTH, TEXTURE_HEIGHT),
            packer: ShelfPacker::new(TEXTURE_WIDTH),
            glyphs: FxHashMap::default(),
            clusters: FxHashMap::default(),
            did_warm_up: false,
            canvas_changed: false,
            stats: AtlasStats::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AtlasConfig {
        self.rasterizer.config()
    }

    /// Rasterize printable ASCII with default colors. Runs once per texture
    /// generation; later calls are no-ops until the atlas is cleared.
    pub fn warm_up(&mut self) -> Result<(), AtlasError> {
        if self.did_warm_up {
            return Ok(());
        }
        let _span = debug_span!("char_atlas_warm_up").entered();
        for code in WARM_UP_RANGE {
            self.get_glyph(code, DEFAULT_COLOR, DEFAULT_COLOR)?;
        }
        self.did_warm_up = true;
        debug!(
            glyphs = WARM_UP_RANGE.count(),
            row_y = self.packer.cursor().row_y,
            "char atlas warmed up"
        );
        Ok(())
    }

    /// Start a render pass. Returns `true` if the atlas was reset, in which
    /// case every previously returned texture position is stale.
    pub fn begin_frame(&mut self) -> Result<bool, AtlasError> {
        if !self.packer.is_over(TEXTURE_CAPACITY) {
            return Ok(false);
        }
        debug!(
            row_y = self.packer.cursor().row_y,
            capacity = TEXTURE_CAPACITY,
            "char atlas over capacity; resetting"
        );
        self.clear_texture();
        self.warm_up()?;
        Ok(true)
    }

    /// Drop every entry and clear the texture. No-op if nothing was packed.
    pub fn clear_texture(&mut self) {
        if self.packer.cursor().is_origin() {
            return;
        }
        debug!(
            row_y = self.packer.cursor().row_y,
            dropped = self.len(),
            "clearing char atlas"
        );
        self.texture.clear();
        self.glyphs.clear();
        self.clusters.clear();
        self.packer.reset();
        self.did_warm_up = false;
        self.canvas_changed = true;
        self.stats.resets += 1;
    }

    /// Glyph for a single code point.
    pub fn get_glyph(&mut self, code: u32, bg: u32, fg: u32) -> Result<RasterizedGlyph, AtlasError> {
        if let Some(glyph) = self.glyphs.get(&(code, bg, fg)) {
            self.stats.hits += 1;
            return Ok(*glyph);
        }
        trace!(code, bg, fg, "glyph cache miss");
        let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
        let mut buf = [0u8; 4];
        let glyph = self.draw(ch.encode_utf8(&mut buf), AttributePair::new(fg, bg))?;
        self.glyphs.insert((code, bg, fg), glyph);
        Ok(glyph)
    }

    /// Glyph for a combining-character cluster, keyed by the whole string.
    pub fn get_glyph_for_cluster(
        &mut self,
        chars: &str,
        bg: u32,
        fg: u32,
    ) -> Result<RasterizedGlyph, AtlasError> {
        if let Some(glyph) = self.clusters.get(chars).and_then(|set| set.get(&(bg, fg))) {
            self.stats.hits += 1;
            return Ok(*glyph);
        }
        trace!(chars, bg, fg, "cluster cache miss");
        let glyph = self.draw(chars, AttributePair::new(fg, bg))?;
        match self.clusters.get_mut(chars) {
            Some(set) => {
                set.insert((bg, fg), glyph);
            }
            None => {
                let mut set = FxHashMap::default();
                set.insert((bg, fg), glyph);
                self.clusters.insert(chars.to_owned(), set);
            }
        }
        Ok(glyph)
    }

    fn draw(&mut self, text: &str, attrs: AttributePair) -> Result<RasterizedGlyph, AtlasError> {
        self.stats.misses += 1;
        let Some(trimmed) = self.rasterizer.rasterize(text, attrs)? else {
            self.stats.null_glyphs += 1;
            return Ok(RasterizedGlyph::NULL);
        };

        let (w, h) = (trimmed.glyph.size.x, trimmed.glyph.size.y);
        let (x, y) = self.packer.place(w, h);
        if let Some(rect) = self.texture.write(x, y, w, h, &trimmed.pixels) {
            self.canvas_changed = true;
            self.stats.bytes_uploaded += rect.area_bytes() as u64;
        }
        Ok(trimmed
            .glyph
            .with_texture_position(x, y, self.texture.dims()))
    }

    /// Cached descriptor for `key`, without rasterizing.
    #[must_use]
    pub fn cached(&self, key: &GlyphKey) -> Option<RasterizedGlyph> {
        match &key.content {
            GlyphContent::Code(code) => self.glyphs.get(&(*code, key.bg, key.fg)).copied(),
            GlyphContent::Cluster(chars) => self
                .clusters
                .get(chars.as_str())
                .and_then(|set| set.get(&(key.bg, key.fg)))
                .copied(),
        }
    }

    /// Number of cached descriptors, null glyphs included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len() + self.clusters.values().map(FxHashMap::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The texture pixels changed since the last [`Self::clear_canvas_changed`].
    #[must_use]
    pub fn has_canvas_changed(&self) -> bool {
        self.canvas_changed
    }

    pub fn clear_canvas_changed(&mut self) {
        self.canvas_changed = false;
    }

    /// Rects written since the last call, for partial uploads.
    pub fn take_dirty_rects(&mut self) -> Vec<AtlasRect> {
        self.texture.take_dirty()
    }

    #[must_use]
    pub fn texture(&self) -> &AtlasTexture {
        &self.texture
    }

    #[must_use]
    pub fn cursor(&self) -> PackingCursor {
        self.packer.cursor()
    }

    #[must_use]
    pub fn stats(&self) -> AtlasStats {
        self.stats
    }

    /// Contrast searches performed so far (memo misses).
    #[must_use]
    pub fn contrast_computations(&self) -> u64 {
        self.rasterizer.contrast().computations()
    }

    /// Forget memoized contrast adjustments. Cached glyphs keep their colors
    /// until the texture is cleared.
    pub fn clear_contrast_cache(&mut self) {
        self.rasterizer.contrast_mut().clear();
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        self.rasterizer.renderer_mut()
    }
}

impl<R> std::fmt::Debug for CharAtlas<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharAtlas")
            .field("cursor", &self.packer.cursor())
            .field("glyphs", &self.glyphs.len())
            .field("clusters", &self.clusters.len())
            .field("did_warm_up", &self.did_warm_up)
            .field("canvas_changed", &self.canvas_changed)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
