#![forbid(unsafe_code)]

//! Glyph atlas for FrankenTerm.
//!
//! Rasterizes terminal glyphs with fully resolved colors, trims them to their
//! visible pixels and packs them into one fixed-size RGBA8 texture that the
//! GPU pipeline samples. Lookups are cached per `(glyph, bg, fg)` attribute
//! triple; when the texture fills up the whole atlas is reset.
//!
//! This crate provides:
//! - [`CharAtlas`], the cache and packer entry point
//! - [`AtlasConfig`] with the color theme, font and cell geometry
//! - [`AttributePair`] for the packed fg/bg attribute words
//! - [`GlyphRenderer`] backends: [`ProceduralRenderer`] and, with the
//!   `fontdue` feature, `FontdueRenderer`

/// Cache, reset protocol and warm-up.
pub mod atlas;
/// Packed fg/bg attribute words.
pub mod attrs;
/// Bounding-box extraction and clipping.
pub mod bbox;
/// Colors, the ANSI palette and luminance math.
pub mod color;
/// Configuration and color resolution.
pub mod config;
/// Minimum-contrast enforcement.
pub mod contrast;
pub mod error;
/// Glyph descriptors and keys.
pub mod glyph;
pub mod packer;
pub mod procedural;
pub mod rasterizer;
/// Scratch canvas and the renderer trait.
pub mod surface;

#[cfg(feature = "fontdue")]
pub mod fontdue_renderer;

pub use atlas::{AtlasStats, CharAtlas, TEXTURE_CAPACITY, WARM_UP_RANGE};
pub use attrs::{AttributePair, BgFlags, ColorMode, ColorSpec, FgFlags};
pub use color::{ColorTheme, ResolvedColor, Rgba};
pub use config::{AtlasConfig, FontWeight, TEXTURE_HEIGHT, TEXTURE_WIDTH};
pub use contrast::{ContrastCache, ContrastEnforcer, ContrastEntry};
pub use error::AtlasError;
#[cfg(feature = "fontdue")]
pub use fontdue_renderer::FontdueRenderer;
pub use glyph::{GlyphContent, GlyphKey, RasterizedGlyph, Vec2};
pub use packer::{AtlasRect, AtlasTexture, PackingCursor, ShelfPacker};
pub use procedural::ProceduralRenderer;
pub use surface::{FontSpec, FontStyle, GlyphMask, GlyphRenderer};
